//! Seam between the orchestrator and the orchestration platform.
//!
//! [`K8Connector`](crate::K8Connector) is the production implementation;
//! tests use the recording client in `fixture`.

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::ClusterConfig;
use crate::error::ClientAcquisitionError;
use crate::service::ServiceSpec;
use crate::workload::WorkloadSpec;

pub type SharedClusterClient = Arc<dyn ClusterClient>;

/// Submits cluster objects to the orchestration platform
#[async_trait]
pub trait ClusterClient: Debug + Send + Sync {
    async fn create_workload(&self, workload: &WorkloadSpec) -> Result<()>;

    async fn create_service(&self, service: &ServiceSpec) -> Result<()>;
}

/// Produces a client for a resolved configuration
pub trait ClientConnector: Send + Sync {
    fn connect(&self, config: &ClusterConfig) -> Result<SharedClusterClient, ClientAcquisitionError>;
}
