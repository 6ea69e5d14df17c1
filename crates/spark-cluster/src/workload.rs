use std::fmt;

use serde::Serialize;

use crate::labels::PodSelector;
use crate::{MASTER_PORT, MASTER_PORT_NAME, MASTER_PREFIX, WEBUI_PORT, WEBUI_PORT_NAME, WORKER_PREFIX};

const START_MASTER: &str = "/start-master";
const START_WORKER: &str = "/start-worker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkloadRole {
    Master,
    Worker,
}

impl fmt::Display for WorkloadRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Master => write!(f, "master"),
            Self::Worker => write!(f, "worker"),
        }
    }
}

/// How running pods are replaced when the workload changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum UpdateStrategy {
    /// roll pods whenever the pod template changes
    #[default]
    RollingOnChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerPort {
    pub name: String,
    pub container_port: u16,
}

impl ContainerPort {
    fn named(name: &str, container_port: u16) -> Self {
        Self {
            name: name.to_owned(),
            container_port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub ports: Vec<ContainerPort>,
}

/// Deployable unit for one role of the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkloadSpec {
    name: String,
    namespace: String,
    role: WorkloadRole,
    replicas: u16,
    update_strategy: UpdateStrategy,
    pod_selector: PodSelector,
    container: ContainerSpec,
}

impl WorkloadSpec {
    fn new(
        name: String,
        namespace: &str,
        role: WorkloadRole,
        replicas: u16,
        image: &str,
        command: Vec<String>,
        ports: Vec<ContainerPort>,
    ) -> Self {
        let pod_selector = PodSelector::for_workload(&name);
        let container = ContainerSpec {
            name: name.clone(),
            image: image.to_owned(),
            command,
            ports,
        };
        Self {
            name,
            namespace: namespace.to_owned(),
            role,
            replicas,
            update_strategy: UpdateStrategy::RollingOnChange,
            pod_selector,
            container,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn role(&self) -> WorkloadRole {
        self.role
    }

    pub fn replicas(&self) -> u16 {
        self.replicas
    }

    pub fn update_strategy(&self) -> UpdateStrategy {
        self.update_strategy
    }

    pub fn pod_selector(&self) -> &PodSelector {
        &self.pod_selector
    }

    pub fn container(&self) -> &ContainerSpec {
        &self.container
    }

    /// container port exposed under `name`
    pub fn find_port(&self, name: &str) -> Option<u16> {
        self.container
            .ports
            .iter()
            .find(|port| port.name == name)
            .map(|port| port.container_port)
    }
}

/// Master workload: `spark-master-<suffix>`, always a single replica.
///
/// The master is started with its own name so it advertises itself under
/// the name of the service that fronts it.
pub fn build_master(namespace: &str, image: &str, suffix: &str) -> WorkloadSpec {
    let name = format!("{MASTER_PREFIX}-{suffix}");
    let command = vec![START_MASTER.to_owned(), name.clone()];
    let ports = vec![
        ContainerPort::named(MASTER_PORT_NAME, MASTER_PORT),
        ContainerPort::named(WEBUI_PORT_NAME, WEBUI_PORT),
    ];
    WorkloadSpec::new(
        name,
        namespace,
        WorkloadRole::Master,
        1,
        image,
        command,
        ports,
    )
}

/// Worker workload: `spark-worker-<suffix>`, registering with `master_url`.
///
/// Workers expose no ports.
pub fn build_worker(
    namespace: &str,
    image: &str,
    suffix: &str,
    replicas: u16,
    master_url: &str,
) -> WorkloadSpec {
    let name = format!("{WORKER_PREFIX}-{suffix}");
    let command = vec![START_WORKER.to_owned(), master_url.to_owned()];
    WorkloadSpec::new(
        name,
        namespace,
        WorkloadRole::Worker,
        replicas,
        image,
        command,
        vec![],
    )
}
