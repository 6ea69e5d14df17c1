use std::fmt;

use fluvio_future::future::timeout;
use fluvio_types::event::StickyEvent;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::client::{ClientConnector, ClusterClient};
use crate::config::ClusterConfig;
use crate::error::{ClusterError, PartialCreation, SubmitFailure};
use crate::model::{ClusterModel, ClusterRequest};
use crate::service::{expose_workload, master_url, ServiceSpec};
use crate::workload::{build_master, build_worker, WorkloadSpec};
use crate::{MASTER_PORT_NAME, WEBUI_PORT_NAME};

/// longest cluster name whose derived object names are valid DNS labels
const MAX_NAME_LEN: usize = 44;
const WEBUI_SUFFIX: &str = "webui";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectKind {
    Workload,
    Service,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Workload => write!(f, "deployment"),
            Self::Service => write!(f, "service"),
        }
    }
}

/// Identifies one object submitted to the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    kind: ObjectKind,
    name: String,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

enum Submission<'a> {
    Workload(&'a WorkloadSpec),
    Service(&'a ServiceSpec),
}

impl Submission<'_> {
    fn object_ref(&self) -> ObjectRef {
        match self {
            Self::Workload(workload) => ObjectRef::new(ObjectKind::Workload, workload.name()),
            Self::Service(service) => ObjectRef::new(ObjectKind::Service, service.name()),
        }
    }
}

/// Every object of one cluster, built but not yet submitted
#[derive(Debug, Clone)]
pub struct ClusterPlan {
    cluster: ClusterModel,
    master: WorkloadSpec,
    worker: WorkloadSpec,
    master_service: ServiceSpec,
    webui_service: ServiceSpec,
    master_url: String,
}

impl ClusterPlan {
    /// Validate `request` and build the cluster objects.
    ///
    /// The worker is pointed at the master through the master-port service,
    /// so the services are built before it.
    pub fn build(config: &ClusterConfig, request: &ClusterRequest) -> Result<Self, ClusterError> {
        let workers = validate_request(request)?;
        let namespace = config.namespace();
        let image = config.image();

        let master = build_master(namespace, image, &request.name);

        let (master_service, master_port) =
            expose_workload(&master, master.name(), MASTER_PORT_NAME).ok_or_else(|| {
                ClusterError::MissingPort {
                    workload: master.name().to_owned(),
                    port: MASTER_PORT_NAME.to_owned(),
                }
            })?;
        let webui_name = format!("{}-{WEBUI_SUFFIX}", master.name());
        let (webui_service, _) =
            expose_workload(&master, &webui_name, WEBUI_PORT_NAME).ok_or_else(|| {
                ClusterError::MissingPort {
                    workload: master.name().to_owned(),
                    port: WEBUI_PORT_NAME.to_owned(),
                }
            })?;

        let master_url = master_url(master_service.name(), &master_port);
        let worker = build_worker(namespace, image, &request.name, workers, &master_url);

        Ok(Self {
            cluster: ClusterModel::from(request),
            master,
            worker,
            master_service,
            webui_service,
            master_url,
        })
    }

    pub fn cluster(&self) -> &ClusterModel {
        &self.cluster
    }

    pub fn master(&self) -> &WorkloadSpec {
        &self.master
    }

    pub fn worker(&self) -> &WorkloadSpec {
        &self.worker
    }

    pub fn master_service(&self) -> &ServiceSpec {
        &self.master_service
    }

    pub fn webui_service(&self) -> &ServiceSpec {
        &self.webui_service
    }

    pub fn master_url(&self) -> &str {
        &self.master_url
    }

    /// objects in submission order
    pub fn objects(&self) -> Vec<ObjectRef> {
        self.submissions().iter().map(Submission::object_ref).collect()
    }

    fn submissions(&self) -> [Submission<'_>; 4] {
        [
            Submission::Workload(&self.master),
            Submission::Workload(&self.worker),
            Submission::Service(&self.master_service),
            Submission::Service(&self.webui_service),
        ]
    }
}

/// returns the worker replica count
fn validate_request(request: &ClusterRequest) -> Result<u16, ClusterError> {
    validate_name(&request.name)?;
    u16::try_from(request.worker_count).map_err(|_| {
        ClusterError::InvalidRequest(format!(
            "workerCount must be between 0 and {}, got {}",
            u16::MAX,
            request.worker_count
        ))
    })
}

fn validate_name(name: &str) -> Result<(), ClusterError> {
    let reason = if name.is_empty() {
        "must not be empty".to_owned()
    } else if name.len() > MAX_NAME_LEN {
        format!("must be at most {MAX_NAME_LEN} characters")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        "may only contain lowercase letters, digits and '-'".to_owned()
    } else if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        "must start with a letter".to_owned()
    } else if name.ends_with('-') {
        "must end with a letter or digit".to_owned()
    } else {
        return Ok(());
    };

    Err(ClusterError::InvalidRequest(format!(
        "cluster name {name:?} {reason}"
    )))
}

/// Outcome of a fully created cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedCluster {
    cluster: ClusterModel,
    location: String,
    objects: Vec<ObjectRef>,
}

impl CreatedCluster {
    pub fn cluster(&self) -> &ClusterModel {
        &self.cluster
    }

    /// master url workers and drivers connect to
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn objects(&self) -> &[ObjectRef] {
        &self.objects
    }

    pub fn into_cluster(self) -> ClusterModel {
        self.cluster
    }
}

/// Provisions clusters with clients produced by `C`
pub struct ClusterCreator<C> {
    config: ClusterConfig,
    connector: C,
}

impl<C: ClientConnector> ClusterCreator<C> {
    pub fn new(config: ClusterConfig, connector: C) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub async fn create(&self, request: &ClusterRequest) -> Result<CreatedCluster, ClusterError> {
        let shutdown = StickyEvent::shared();
        self.create_with_shutdown(request, &shutdown).await
    }

    /// Create the cluster, stopping before the next submission once
    /// `shutdown` is notified.
    ///
    /// Nothing is submitted unless the request is valid and a client was
    /// acquired. Objects created before a failure are left in place and
    /// reported in the error.
    #[instrument(
        skip(self, request, shutdown),
        fields(cluster = %request.name, namespace = self.config.namespace())
    )]
    pub async fn create_with_shutdown(
        &self,
        request: &ClusterRequest,
        shutdown: &StickyEvent,
    ) -> Result<CreatedCluster, ClusterError> {
        let plan = ClusterPlan::build(&self.config, request)?;
        debug!(master_url = plan.master_url(), "cluster planned");

        let client = self.connector.connect(&self.config).map_err(|err| {
            error!(%err, "unable to acquire client");
            err
        })?;

        let objects = self.submit_all(client.as_ref(), &plan, shutdown).await?;
        info!(location = plan.master_url(), "cluster created");

        Ok(CreatedCluster {
            cluster: plan.cluster,
            location: plan.master_url,
            objects,
        })
    }

    async fn submit_all(
        &self,
        client: &dyn ClusterClient,
        plan: &ClusterPlan,
        shutdown: &StickyEvent,
    ) -> Result<Vec<ObjectRef>, PartialCreation> {
        let submissions = plan.submissions();
        let mut created = Vec::with_capacity(submissions.len());

        for (index, submission) in submissions.iter().enumerate() {
            let object = submission.object_ref();
            if let Err(cause) = self.submit(client, submission, shutdown).await {
                error!(%object, %cause, "submission failed");
                let skipped = submissions[index + 1..]
                    .iter()
                    .map(Submission::object_ref)
                    .collect();
                return Err(PartialCreation {
                    created,
                    failed: object,
                    skipped,
                    cause,
                });
            }
            debug!(%object, "created");
            created.push(object);
        }

        Ok(created)
    }

    async fn submit(
        &self,
        client: &dyn ClusterClient,
        submission: &Submission<'_>,
        shutdown: &StickyEvent,
    ) -> Result<(), SubmitFailure> {
        use tokio::select;

        if shutdown.is_set() {
            return Err(SubmitFailure::Cancelled);
        }

        let limit = self.config.submit_timeout();
        let request = async {
            match submission {
                Submission::Workload(workload) => client.create_workload(workload).await,
                Submission::Service(service) => client.create_service(service).await,
            }
        };

        select! {
            result = timeout(limit, request) => match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(err)) => Err(SubmitFailure::Rejected(err)),
                Err(_) => Err(SubmitFailure::TimedOut(limit)),
            },
            _ = shutdown.listen() => Err(SubmitFailure::Cancelled),
        }
    }
}
