//! In-memory cluster client for tests.
//!
//! [`RecordingClient`] accepts every submission unless told to reject or
//! stall a named object, and remembers what it was asked to create.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_lock::Mutex;
use async_trait::async_trait;
use fluvio_future::timer::sleep;
use tracing::debug;

use crate::client::{ClientConnector, ClusterClient, SharedClusterClient};
use crate::config::ClusterConfig;
use crate::create::{ObjectKind, ObjectRef};
use crate::error::ClientAcquisitionError;
use crate::service::ServiceSpec;
use crate::workload::WorkloadSpec;

#[derive(Debug, Default)]
pub struct RecordingClient {
    reject: Option<String>,
    stall: Option<(String, Duration)>,
    attempts: Mutex<Vec<ObjectRef>>,
    workloads: Mutex<Vec<WorkloadSpec>>,
    services: Mutex<Vec<ServiceSpec>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// fails the submission of the object called `name`
    pub fn rejecting(name: impl Into<String>) -> Self {
        Self {
            reject: Some(name.into()),
            ..Default::default()
        }
    }

    /// holds the submission of the object called `name` for `delay`
    pub fn stalling(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            stall: Some((name.into(), delay)),
            ..Default::default()
        }
    }

    /// every submission received, accepted or not
    pub async fn attempts(&self) -> Vec<ObjectRef> {
        self.attempts.lock().await.clone()
    }

    /// accepted workloads
    pub async fn workloads(&self) -> Vec<WorkloadSpec> {
        self.workloads.lock().await.clone()
    }

    /// accepted services
    pub async fn services(&self) -> Vec<ServiceSpec> {
        self.services.lock().await.clone()
    }

    async fn receive(&self, object: ObjectRef) -> Result<()> {
        debug!(%object, "received");
        self.attempts.lock().await.push(object.clone());

        if let Some((name, delay)) = &self.stall {
            if name == object.name() {
                sleep(*delay).await;
            }
        }

        match &self.reject {
            Some(name) if name == object.name() => Err(anyhow!("{object} already exists")),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterClient for RecordingClient {
    async fn create_workload(&self, workload: &WorkloadSpec) -> Result<()> {
        self.receive(ObjectRef::new(ObjectKind::Workload, workload.name()))
            .await?;
        self.workloads.lock().await.push(workload.clone());
        Ok(())
    }

    async fn create_service(&self, service: &ServiceSpec) -> Result<()> {
        self.receive(ObjectRef::new(ObjectKind::Service, service.name()))
            .await?;
        self.services.lock().await.push(service.clone());
        Ok(())
    }
}

/// Hands out the same [`RecordingClient`] on every connect
#[derive(Debug, Clone)]
pub struct StaticConnector {
    client: Arc<RecordingClient>,
}

impl StaticConnector {
    pub fn new(client: Arc<RecordingClient>) -> Self {
        Self { client }
    }
}

impl ClientConnector for StaticConnector {
    fn connect(&self, _config: &ClusterConfig) -> Result<SharedClusterClient, ClientAcquisitionError> {
        Ok(self.client.clone())
    }
}

/// Refuses every connect, keeping its [`RecordingClient`] to itself so
/// tests can check that nothing was submitted
#[derive(Debug, Clone)]
pub struct FailingConnector {
    client: Arc<RecordingClient>,
    connects: Arc<AtomicUsize>,
}

impl FailingConnector {
    pub fn new(client: Arc<RecordingClient>) -> Self {
        Self {
            client,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// client that would have been handed out
    pub fn client(&self) -> &Arc<RecordingClient> {
        &self.client
    }

    /// number of connect calls so far
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ClientConnector for FailingConnector {
    fn connect(&self, config: &ClusterConfig) -> Result<SharedClusterClient, ClientAcquisitionError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Err(ClientAcquisitionError::NoCurrentContext(PathBuf::from(
            config.kube_config(),
        )))
    }
}
