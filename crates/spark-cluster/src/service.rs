use serde::Serialize;

use crate::labels::PodSelector;
use crate::workload::WorkloadSpec;

/// Port allocated for a service; target port is never remapped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePort {
    pub name: String,
    pub service_port: u16,
    pub target_port: u16,
}

/// Stable network endpoint routing to the pods of one workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSpec {
    name: String,
    namespace: String,
    selector: PodSelector,
    port: ServicePort,
}

impl ServiceSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn selector(&self) -> &PodSelector {
        &self.selector
    }

    pub fn port(&self) -> &ServicePort {
        &self.port
    }
}

/// Build a service exposing `port` on the pods matched by `selector`.
///
/// `selector` must be the pod selector of the workload being exposed.
pub fn build_service(
    namespace: &str,
    name: &str,
    port_name: &str,
    port: u16,
    selector: &PodSelector,
) -> (ServiceSpec, ServicePort) {
    let service_port = ServicePort {
        name: port_name.to_owned(),
        service_port: port,
        target_port: port,
    };
    let spec = ServiceSpec {
        name: name.to_owned(),
        namespace: namespace.to_owned(),
        selector: selector.clone(),
        port: service_port.clone(),
    };
    (spec, service_port)
}

/// Expose the named container port of `workload`, selecting its own pods.
///
/// Returns `None` if the workload has no such port.
pub fn expose_workload(
    workload: &WorkloadSpec,
    service_name: &str,
    port_name: &str,
) -> Option<(ServiceSpec, ServicePort)> {
    let port = workload.find_port(port_name)?;
    Some(build_service(
        workload.namespace(),
        service_name,
        port_name,
        port,
        workload.pod_selector(),
    ))
}

/// connection url workers use to register with the master
pub fn master_url(service_name: &str, port: &ServicePort) -> String {
    format!("spark://{}:{}", service_name, port.service_port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::{build_master, build_worker};

    #[test]
    fn test_master_url_format() {
        let selector = PodSelector::for_workload("s");
        let (_, port) = build_service("default", "s", "spark-master", 7077, &selector);
        assert_eq!(master_url("s", &port), "spark://s:7077");
    }

    #[test]
    fn test_port_not_remapped() {
        let selector = PodSelector::for_workload("w");
        let (spec, port) = build_service("default", "w-webui", "spark-webui", 8080, &selector);
        assert_eq!(port.service_port, 8080);
        assert_eq!(port.target_port, 8080);
        assert_eq!(spec.port(), &port);
        assert_eq!(spec.namespace(), "default");
    }

    #[test]
    fn test_expose_uses_workload_selector() {
        let master = build_master("spark", "img", "c1");
        let (svc, port) =
            expose_workload(&master, "spark-master-c1", "spark-master").expect("port exists");
        assert_eq!(svc.selector(), master.pod_selector());
        assert_eq!(svc.name(), "spark-master-c1");
        assert_eq!(port.service_port, 7077);

        let (webui, _) =
            expose_workload(&master, "spark-master-c1-webui", "spark-webui").expect("port exists");
        assert_eq!(webui.selector(), master.pod_selector());
        assert_eq!(webui.port().target_port, 8080);
    }

    #[test]
    fn test_expose_missing_port() {
        let worker = build_worker("spark", "img", "c1", 1, "spark://m:7077");
        assert!(expose_workload(&worker, "spark-worker-c1", "spark-master").is_none());
    }
}
