//! Request handling for the `clusters` resource.
//!
//! Every call resolves its configuration afresh, so changes to the
//! environment are picked up without a restart. Errors are turned into
//! status codes and an [`ErrorResponse`] body.

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::client::ClientConnector;
use crate::config::{ClusterConfig, ConfigSource};
use crate::create::ClusterCreator;
use crate::error::{ClusterError, ConfigError, SubmitFailure};
use crate::model::{ClusterRequest, ErrorResponse, SingleCluster};

pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;
pub const STATUS_NOT_IMPLEMENTED: u16 = 501;
pub const STATUS_BAD_GATEWAY: u16 = 502;
pub const STATUS_GATEWAY_TIMEOUT: u16 = 504;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Created {
        location: String,
        #[serde(flatten)]
        body: SingleCluster,
    },
    Error {
        #[serde(skip)]
        status: u16,
        #[serde(flatten)]
        body: ErrorResponse,
    },
}

impl ApiResponse {
    pub fn status(&self) -> u16 {
        match self {
            Self::Created { .. } => STATUS_CREATED,
            Self::Error { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    /// master url of a created cluster
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Created { location, .. } => Some(location),
            Self::Error { .. } => None,
        }
    }

    fn error(status: u16, title: &str, details: String) -> Self {
        Self::Error {
            status,
            body: ErrorResponse::single(status, title, details),
        }
    }
}

impl From<ClusterError> for ApiResponse {
    fn from(err: ClusterError) -> Self {
        let (status, title) = match &err {
            ClusterError::InvalidRequest(_) => (STATUS_BAD_REQUEST, "Invalid Request"),
            ClusterError::Config(ConfigError::MissingSettings(_)) => {
                (STATUS_INTERNAL_ERROR, "Missing Configuration")
            }
            ClusterError::Config(ConfigError::InvalidSetting { .. }) => {
                (STATUS_INTERNAL_ERROR, "Invalid Configuration")
            }
            ClusterError::ClientAcquisition(_) => (STATUS_BAD_GATEWAY, "Client Unavailable"),
            ClusterError::MissingPort { .. } => (STATUS_INTERNAL_ERROR, "Creation Failed"),
            ClusterError::NotImplemented(_) => (STATUS_NOT_IMPLEMENTED, "Not Implemented"),
            ClusterError::Submission(partial) => {
                let status = match partial.cause {
                    SubmitFailure::TimedOut(_) => STATUS_GATEWAY_TIMEOUT,
                    _ => STATUS_INTERNAL_ERROR,
                };
                let title = if partial.is_partial() {
                    "Partially Created"
                } else {
                    "Creation Failed"
                };
                (status, title)
            }
        };

        Self::error(status, title, details(&err))
    }
}

/// Error message with its chain of causes.
fn details(err: &ClusterError) -> String {
    match err {
        ClusterError::Submission(partial) if partial.is_partial() => {
            let created: Vec<String> = partial.created.iter().map(ToString::to_string).collect();
            format!("{err}; already created: {}", created.join(", "))
        }
        ClusterError::ClientAcquisition(source) => match std::error::Error::source(source) {
            Some(cause) => format!("{err}: {source}: {cause}"),
            None => format!("{err}: {source}"),
        },
        _ => err.to_string(),
    }
}

/// Handlers for the `clusters` resource
pub struct ClusterApi<S, C> {
    source: S,
    connector: C,
}

impl<S, C> ClusterApi<S, C>
where
    S: ConfigSource,
    C: ClientConnector + Clone,
{
    pub fn new(source: S, connector: C) -> Self {
        Self { source, connector }
    }

    #[instrument(skip(self, request), fields(cluster = %request.name))]
    pub async fn create_cluster(&self, request: &ClusterRequest) -> ApiResponse {
        match self.try_create(request).await {
            Ok(response) => {
                info!(location = ?response.location(), "cluster request completed");
                response
            }
            Err(err) => {
                error!(%err, "cluster request failed");
                err.into()
            }
        }
    }

    async fn try_create(&self, request: &ClusterRequest) -> Result<ApiResponse, ClusterError> {
        let config = ClusterConfig::resolve(&self.source)?;
        let creator = ClusterCreator::new(config, self.connector.clone());
        let created = creator.create(request).await?;
        Ok(ApiResponse::Created {
            location: created.location().to_owned(),
            body: SingleCluster {
                cluster: created.into_cluster(),
            },
        })
    }

    pub async fn find_clusters(&self) -> ApiResponse {
        ClusterError::NotImplemented("FindClusters").into()
    }

    pub async fn find_cluster(&self, _name: &str) -> ApiResponse {
        ClusterError::NotImplemented("FindSingleCluster").into()
    }

    pub async fn update_cluster(&self, _name: &str, _request: &ClusterRequest) -> ApiResponse {
        ClusterError::NotImplemented("UpdateSingleCluster").into()
    }

    pub async fn delete_cluster(&self, _name: &str) -> ApiResponse {
        ClusterError::NotImplemented("DeleteSingleCluster").into()
    }
}
