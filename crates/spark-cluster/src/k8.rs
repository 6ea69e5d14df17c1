//! Kubernetes implementation of the cluster client.
//!
//! Workloads become `Deployment` objects and services become `Service`
//! objects, created through [`k8_client`].

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use k8_client::{K8Client, SharedK8Client};
use k8_client::meta_client::MetadataClient;
use k8_config::{K8Config, KubeConfig, KubeContext};
use tracing::{debug, info, instrument, trace};

use crate::client::{ClientConnector, ClusterClient, SharedClusterClient};
use crate::config::ClusterConfig;
use crate::error::ClientAcquisitionError;
use crate::service::ServiceSpec;
use crate::workload::WorkloadSpec;

use self::k8_convert::{deployment_input, service_input};

/// Connects to the Kubernetes API described by the configured kubeconfig
#[derive(Debug, Default, Clone, Copy)]
pub struct K8Connector;

impl K8Connector {
    fn load_k8_config(config: &ClusterConfig) -> Result<K8Config, ClientAcquisitionError> {
        let path = config.kube_config();
        let kube_config =
            KubeConfig::from_file(path).map_err(|source| ClientAcquisitionError::Kubeconfig {
                path: path.to_owned(),
                source,
            })?;

        let namespace = kube_config
            .current_context()
            .map(|ctx| ctx.context.namespace().to_owned())
            .ok_or_else(|| ClientAcquisitionError::NoCurrentContext(path.to_owned()))?;
        let api_path = kube_config
            .current_cluster()
            .map(|cluster| cluster.cluster.server.clone())
            .ok_or_else(|| ClientAcquisitionError::NoCurrentCluster(path.to_owned()))?;

        debug!(%api_path, %namespace, "loaded kubeconfig");

        Ok(K8Config::KubeConfig(KubeContext {
            namespace,
            api_path,
            config: kube_config,
        }))
    }
}

impl ClientConnector for K8Connector {
    #[instrument(skip(self, config), fields(kube_config = ?config.kube_config()))]
    fn connect(&self, config: &ClusterConfig) -> Result<SharedClusterClient, ClientAcquisitionError> {
        let k8_config = Self::load_k8_config(config)?;
        let client = K8Client::new(k8_config).map_err(ClientAcquisitionError::K8ClientError)?;
        info!("kubernetes client ready");
        Ok(Arc::new(K8ClusterClient::new(Arc::new(client))))
    }
}

/// Creates cluster objects with a shared [`K8Client`]
#[derive(Debug, Clone)]
pub struct K8ClusterClient {
    client: SharedK8Client,
}

impl K8ClusterClient {
    pub fn new(client: SharedK8Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterClient for K8ClusterClient {
    #[instrument(skip(self, workload), fields(name = workload.name()))]
    async fn create_workload(&self, workload: &WorkloadSpec) -> Result<()> {
        let input = deployment_input(workload);
        trace!(?input, "deployment");
        self.client.create_item(input).await?;
        debug!("deployment created");
        Ok(())
    }

    #[instrument(skip(self, service), fields(name = service.name()))]
    async fn create_service(&self, service: &ServiceSpec) -> Result<()> {
        let input = service_input(service);
        trace!(?input, "service");
        self.client.create_item(input).await?;
        debug!("service created");
        Ok(())
    }
}

mod k8_convert {

    use std::collections::HashMap;

    use k8_types::{InputK8Obj, InputObjectMeta, LabelProvider, LabelSelector, TemplateMeta, TemplateSpec};
    use k8_types::app::deployment::DeploymentSpec;
    use k8_types::core::pod::{ContainerPortSpec, ContainerSpec, PodSpec};
    use k8_types::core::service::{ServicePort, ServiceSpec, TargetPort};

    use crate::labels::PodSelector;
    use crate::workload::WorkloadSpec;

    const APP_LABEL: (&str, &str) = ("app", "spark");

    fn object_meta(name: &str, namespace: &str, selector: &PodSelector) -> InputObjectMeta {
        let mut labels: HashMap<String, String> = selector.to_k8_labels();
        labels.insert(APP_LABEL.0.to_owned(), APP_LABEL.1.to_owned());
        InputObjectMeta {
            name: name.to_owned(),
            namespace: namespace.to_owned(),
            labels,
            ..Default::default()
        }
    }

    /// convert workload into a deployment.
    /// Deployments roll their pods whenever the template changes, which is
    /// what `UpdateStrategy::RollingOnChange` asks for.
    pub fn deployment_input(workload: &WorkloadSpec) -> InputK8Obj<DeploymentSpec> {
        let selector = workload.pod_selector();
        let container = workload.container();

        let ports = container
            .ports
            .iter()
            .map(|port| ContainerPortSpec {
                name: Some(port.name.clone()),
                container_port: port.container_port,
                ..Default::default()
            })
            .collect();

        let template = TemplateSpec {
            metadata: Some(TemplateMeta::default().set_labels(selector.iter().collect::<Vec<_>>())),
            spec: PodSpec {
                containers: vec![ContainerSpec {
                    name: container.name.clone(),
                    image: Some(container.image.clone()),
                    command: container.command.clone(),
                    ports,
                    ..Default::default()
                }],
                ..Default::default()
            },
        };

        let spec = DeploymentSpec {
            replicas: Some(workload.replicas().into()),
            selector: LabelSelector {
                match_labels: selector.to_k8_labels(),
            },
            template,
            ..Default::default()
        };

        InputK8Obj::new(
            spec,
            object_meta(workload.name(), workload.namespace(), selector),
        )
    }

    pub fn service_input(service: &crate::service::ServiceSpec) -> InputK8Obj<ServiceSpec> {
        let port = service.port();
        let k8_port = ServicePort {
            name: Some(port.name.clone()),
            port: port.service_port,
            target_port: Some(TargetPort::Number(port.target_port)),
            ..Default::default()
        };

        let spec = ServiceSpec {
            ports: vec![k8_port],
            selector: Some(service.selector().to_k8_labels()),
            ..Default::default()
        };

        InputK8Obj::new(
            spec,
            object_meta(service.name(), service.namespace(), service.selector()),
        )
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::service::expose_workload;
        use crate::workload::{build_master, build_worker};

        #[test]
        fn test_deployment_labels_agree() {
            let master = build_master("spark", "spark:2.0", "c1");
            let input = deployment_input(&master);

            assert_eq!(input.metadata.name, "spark-master-c1");
            assert_eq!(input.metadata.namespace, "spark");
            assert_eq!(
                input.metadata.labels.get("app").map(|v| v.as_str()),
                Some("spark")
            );

            let match_labels = &input.spec.selector.match_labels;
            assert_eq!(match_labels, &master.pod_selector().to_k8_labels());
            let template_meta = input.spec.template.metadata.as_ref().expect("template meta");
            assert_eq!(&template_meta.labels, match_labels);
            assert_eq!(input.spec.replicas, Some(1));
        }

        #[test]
        fn test_deployment_container() {
            let master = build_master("spark", "spark:2.0", "c1");
            let input = deployment_input(&master);
            let containers = &input.spec.template.spec.containers;
            assert_eq!(containers.len(), 1);

            let container = &containers[0];
            assert_eq!(container.name, "spark-master-c1");
            assert_eq!(container.image.as_deref(), Some("spark:2.0"));
            assert_eq!(container.command, vec!["/start-master", "spark-master-c1"]);
            assert_eq!(container.ports.len(), 2);
            assert_eq!(container.ports[0].container_port, 7077);
            assert_eq!(container.ports[0].name.as_deref(), Some("spark-master"));
            assert_eq!(container.ports[1].container_port, 8080);
        }

        #[test]
        fn test_worker_deployment_replicas() {
            let worker = build_worker("spark", "spark:2.0", "c1", 0, "spark://spark-master-c1:7077");
            let input = deployment_input(&worker);
            assert_eq!(input.spec.replicas, Some(0));
            assert!(input.spec.template.spec.containers[0].ports.is_empty());
        }

        #[test]
        fn test_service_selects_workload_pods() {
            let master = build_master("spark", "spark:2.0", "c1");
            let deployment = deployment_input(&master);
            let (service, _) =
                expose_workload(&master, "spark-master-c1", "spark-master").expect("port");
            let input = service_input(&service);

            assert_eq!(input.metadata.name, "spark-master-c1");
            assert_eq!(
                input.spec.selector.as_ref(),
                Some(&deployment.spec.selector.match_labels)
            );
            assert_eq!(input.spec.ports.len(), 1);
            assert_eq!(input.spec.ports[0].port, 7077);
            assert!(matches!(
                input.spec.ports[0].target_port,
                Some(TargetPort::Number(7077))
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_missing_kubeconfig() {
        let config = ClusterConfig::builder()
            .namespace("spark")
            .kube_config("/nonexistent/kubeconfig")
            .image("spark:2.0")
            .build()
            .expect("config");

        let err = K8Connector.connect(&config).expect_err("no kubeconfig");
        assert!(matches!(
            err,
            ClientAcquisitionError::Kubeconfig { ref path, .. }
                if path == Path::new("/nonexistent/kubeconfig")
        ));
    }
}
