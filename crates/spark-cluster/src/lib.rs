//! Provisioning of Spark master/worker clusters on Kubernetes.
//!
//! A single [`ClusterRequest`] is turned into a master deployment, a worker
//! deployment and the two services exposing the master. The specs are
//! built as plain values by a [`ClusterPlan`] and then submitted, in order,
//! through a [`ClusterClient`] by a [`ClusterCreator`].
//!
//! # Example
//!
//! ```no_run
//! use spark_cluster::{ClusterConfig, ClusterCreator, ClusterRequest, ClusterError, K8Connector};
//! # async fn example() -> Result<(), ClusterError> {
//! let config = ClusterConfig::builder()
//!     .namespace("spark")
//!     .kube_config("/home/me/.kube/config")
//!     .image("radanalyticsio/openshift-spark")
//!     .build()?;
//! let creator = ClusterCreator::new(config, K8Connector);
//! let created = creator.create(&ClusterRequest::new("c1", 2)).await?;
//! println!("master at {}", created.location());
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

mod error;
mod labels;
mod workload;
mod service;
mod config;
mod model;
mod create;

pub mod client;
pub mod k8;
pub mod api;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(any(test, feature = "fixture"))]
pub mod fixture;

pub use error::{ClusterError, ConfigError, ClientAcquisitionError, PartialCreation, SubmitFailure};
pub use labels::{PodSelector, SELECTOR_KEY};
pub use workload::{
    WorkloadSpec, WorkloadRole, ContainerSpec, ContainerPort, UpdateStrategy, build_master,
    build_worker,
};
pub use service::{ServiceSpec, ServicePort, build_service, expose_workload, master_url};
pub use config::{ClusterConfig, ClusterConfigBuilder, ConfigSource, EnvSource};
pub use model::{ClusterRequest, ClusterModel, SingleCluster, ErrorModel, ErrorResponse};
pub use create::{ClusterPlan, ClusterCreator, CreatedCluster, ObjectRef, ObjectKind};
pub use client::{ClusterClient, ClientConnector, SharedClusterClient};
pub use k8::K8Connector;

/// Port the master listens on for workers
pub const MASTER_PORT: u16 = 7077;
/// Port of the master's web ui
pub const WEBUI_PORT: u16 = 8080;

pub const MASTER_PORT_NAME: &str = "spark-master";
pub const WEBUI_PORT_NAME: &str = "spark-webui";

pub const MASTER_PREFIX: &str = "spark-master";
pub const WORKER_PREFIX: &str = "spark-worker";
