use std::path::PathBuf;
use std::time::Duration;

use k8_config::ConfigError as K8ConfigError;

use crate::create::ObjectRef;

/// The types of errors that can occur while provisioning a cluster
#[derive(thiserror::Error, Debug)]
pub enum ClusterError {
    /// Required configuration is absent or malformed
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The request was rejected before anything was built
    #[error("Invalid cluster request: {0}")]
    InvalidRequest(String),
    /// The orchestration client could not be created
    #[error("Unable to acquire orchestration client")]
    ClientAcquisition(#[from] ClientAcquisitionError),
    /// A workload lacks a port a service is meant to expose
    #[error("Workload {workload} does not expose port {port}")]
    MissingPort { workload: String, port: String },
    /// One of the cluster objects was not created
    #[error(transparent)]
    Submission(#[from] PartialCreation),
    /// Operation has no implementation yet
    #[error("operation clusters.{0} has not yet been implemented")]
    NotImplemented(&'static str),
}

/// Errors resolving the cluster configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// One or more required settings are not set
    #[error("{} must be set", .0.join(", "))]
    MissingSettings(Vec<String>),
    /// A setting is present but cannot be used
    #[error("Invalid value {value:?} for {key}")]
    InvalidSetting { key: String, value: String },
}

/// Errors that may occur while creating the orchestration client
#[derive(thiserror::Error, Debug)]
pub enum ClientAcquisitionError {
    /// The kubeconfig file could not be read or parsed
    #[error("Unable to load kubeconfig {path:?}")]
    Kubeconfig {
        path: PathBuf,
        source: K8ConfigError,
    },
    /// The kubeconfig has no usable current context
    #[error("Kubeconfig {0:?} has no current context")]
    NoCurrentContext(PathBuf),
    /// The current context refers to an unknown cluster
    #[error("Kubeconfig {0:?} has no cluster for the current context")]
    NoCurrentCluster(PathBuf),
    /// An error occurred with the Kubernetes client.
    #[error("Kubernetes client error")]
    K8ClientError(#[source] anyhow::Error),
}

/// Why a single object submission failed
#[derive(thiserror::Error, Debug)]
pub enum SubmitFailure {
    #[error("rejected by the cluster: {0:#}")]
    Rejected(anyhow::Error),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("cancelled")]
    Cancelled,
}

impl SubmitFailure {
    /// whether submitting the same object again may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }
}

/// Cluster objects were only partly created.
///
/// Submission stops at the first failure; nothing already created is
/// rolled back.
#[derive(thiserror::Error, Debug)]
#[error("Failed to create {failed}: {cause}")]
pub struct PartialCreation {
    pub created: Vec<ObjectRef>,
    pub failed: ObjectRef,
    pub skipped: Vec<ObjectRef>,
    #[source]
    pub cause: SubmitFailure,
}

impl PartialCreation {
    /// true if at least one object exists on the cluster
    pub fn is_partial(&self) -> bool {
        !self.created.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create::ObjectKind;

    #[test]
    fn test_missing_settings_message() {
        let err = ConfigError::MissingSettings(vec!["A".to_owned(), "B".to_owned()]);
        assert_eq!(err.to_string(), "A, B must be set");
    }

    #[test]
    fn test_client_error_keeps_source() {
        let err = ClientAcquisitionError::K8ClientError(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Kubernetes client error");
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "connection refused");
    }

    #[test]
    fn test_partial_creation() {
        let err = PartialCreation {
            created: vec![],
            failed: ObjectRef::new(ObjectKind::Workload, "spark-master-c1"),
            skipped: vec![ObjectRef::new(ObjectKind::Workload, "spark-worker-c1")],
            cause: SubmitFailure::TimedOut(Duration::from_secs(5)),
        };
        assert!(!err.is_partial());
        assert!(err.cause.is_retryable());
        assert_eq!(
            err.to_string(),
            "Failed to create deployment/spark-master-c1: timed out after 5s"
        );
    }
}
