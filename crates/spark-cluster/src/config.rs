use std::collections::HashMap;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_builder::Builder;
use tracing::debug;

use crate::error::ConfigError;

pub const NAMESPACE_ENV: &str = "SPARK_CLUSTER_NAMESPACE";
pub const KUBE_CONFIG_ENV: &str = "SPARK_CLUSTER_KUBE_CONFIG";
pub const IMAGE_ENV: &str = "SPARK_CLUSTER_IMAGE";
/// optional, in seconds; must be greater than zero
pub const SUBMIT_TIMEOUT_ENV: &str = "SPARK_CLUSTER_SUBMIT_TIMEOUT";

const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where configuration values are looked up
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads settings from the process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Describes where and how clusters are provisioned
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(private, name = "build_impl", validate = "Self::validate"))]
pub struct ClusterConfig {
    /// Kubernetes namespace all cluster objects are created in
    #[builder(setter(into))]
    namespace: String,
    /// Path to the kubeconfig used to reach the Kubernetes API
    #[builder(setter(into))]
    kube_config: PathBuf,
    /// Container image for both master and workers
    #[builder(setter(into))]
    image: String,
    /// Upper bound on each object submission
    #[builder(default = "DEFAULT_SUBMIT_TIMEOUT")]
    submit_timeout: Duration,
}

impl ClusterConfig {
    pub fn builder() -> ClusterConfigBuilder {
        ClusterConfigBuilder::default()
    }

    /// Resolve the configuration from `source`.
    ///
    /// Empty values count as missing. All missing settings are reported
    /// together.
    pub fn resolve<S: ConfigSource + ?Sized>(source: &S) -> Result<Self, ConfigError> {
        let lookup = |key: &str| source.get(key).filter(|value| !value.trim().is_empty());

        let namespace = lookup(NAMESPACE_ENV);
        let kube_config = lookup(KUBE_CONFIG_ENV);
        let image = lookup(IMAGE_ENV);

        let (Some(namespace), Some(kube_config), Some(image)) = (&namespace, &kube_config, &image)
        else {
            let missing = [
                (NAMESPACE_ENV, namespace.is_none()),
                (KUBE_CONFIG_ENV, kube_config.is_none()),
                (IMAGE_ENV, image.is_none()),
            ]
            .into_iter()
            .filter(|(_, absent)| *absent)
            .map(|(key, _)| key.to_owned())
            .collect();
            return Err(ConfigError::MissingSettings(missing));
        };

        let mut builder = Self::builder();
        builder
            .namespace(namespace)
            .kube_config(kube_config)
            .image(image);

        if let Some(raw) = lookup(SUBMIT_TIMEOUT_ENV) {
            let secs: NonZeroU64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidSetting {
                    key: SUBMIT_TIMEOUT_ENV.to_owned(),
                    value: raw.clone(),
                })?;
            builder.submit_timeout(Duration::from_secs(secs.get()));
        }

        let config = builder.build()?;
        debug!(?config, "resolved cluster config");
        Ok(config)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn kube_config(&self) -> &Path {
        &self.kube_config
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn submit_timeout(&self) -> Duration {
        self.submit_timeout
    }
}

impl ClusterConfigBuilder {
    /// rejects a zero submit timeout, reporting the offending value
    fn validate(&self) -> Result<(), String> {
        match self.submit_timeout {
            Some(timeout) if timeout.is_zero() => Err(format!("{timeout:?}")),
            _ => Ok(()),
        }
    }

    /// Creates a [`ClusterConfig`] with the collected configuration options.
    ///
    /// Fails if `namespace`, `kube_config` or `image` was never set, or if
    /// `submit_timeout` is zero.
    pub fn build(&self) -> Result<ClusterConfig, ConfigError> {
        self.build_impl().map_err(|err| match err {
            ClusterConfigBuilderError::UninitializedField(field) => {
                ConfigError::MissingSettings(vec![field.to_owned()])
            }
            ClusterConfigBuilderError::ValidationError(value) => ConfigError::InvalidSetting {
                key: "submit_timeout".to_owned(),
                value,
            },
        })
    }
}
