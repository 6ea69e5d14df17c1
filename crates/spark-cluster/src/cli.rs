//! Command line front end for the `clusters` handlers.
//!
//! Settings come from the `SPARK_CLUSTER_*` environment variables, the
//! same way the handlers resolve them.

use anyhow::Result;
use clap::Parser;

use crate::api::{ApiResponse, ClusterApi};
use crate::client::ClientConnector;
use crate::config::ConfigSource;
use crate::model::ClusterRequest;

#[derive(Debug, Parser)]
#[command(name = "spark-cluster", about = "Provision Spark clusters on Kubernetes")]
pub struct SparkClusterCli {
    #[command(subcommand)]
    pub cmd: ClusterCmd,
}

#[derive(Debug, Parser)]
pub enum ClusterCmd {
    /// Create a master, workers and the services exposing the master
    #[command(name = "create")]
    Create(CreateOpt),

    /// List clusters
    #[command(name = "list")]
    List,

    /// Show a single cluster
    #[command(name = "get")]
    Get { name: String },

    /// Change the size of a cluster
    #[command(name = "update")]
    Update(CreateOpt),

    /// Delete a cluster
    #[command(name = "delete")]
    Delete { name: String },
}

#[derive(Debug, Parser)]
pub struct CreateOpt {
    /// Cluster name, used to derive every object name
    name: String,

    /// Number of worker replicas
    #[arg(long, default_value_t = 1)]
    workers: i32,

    /// Number of masters; only one is provisioned
    #[arg(long)]
    masters: Option<i32>,
}

impl CreateOpt {
    fn request(&self) -> ClusterRequest {
        let request = ClusterRequest::new(self.name.clone(), self.workers);
        match self.masters {
            Some(masters) => request.with_master_count(masters),
            None => request,
        }
    }
}

impl ClusterCmd {
    pub async fn process<S, C>(self, api: &ClusterApi<S, C>) -> ApiResponse
    where
        S: ConfigSource,
        C: ClientConnector + Clone,
    {
        match self {
            Self::Create(opt) => api.create_cluster(&opt.request()).await,
            Self::List => api.find_clusters().await,
            Self::Get { name } => api.find_cluster(&name).await,
            Self::Update(opt) => api.update_cluster(&opt.name, &opt.request()).await,
            Self::Delete { name } => api.delete_cluster(&name).await,
        }
    }
}

/// pretty JSON rendering of a response
pub fn render(response: &ApiResponse) -> Result<String> {
    Ok(serde_json::to_string_pretty(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(command: &str) -> Result<SparkClusterCli, clap::error::Error> {
        SparkClusterCli::try_parse_from(command.split_whitespace())
    }

    #[test]
    fn test_parse_create() {
        let cli = parse("spark-cluster create c1 --workers 3").expect("valid create");
        let ClusterCmd::Create(opt) = cli.cmd else {
            panic!("expected create");
        };
        assert_eq!(opt.request(), ClusterRequest::new("c1", 3));

        let cli = parse("spark-cluster create c1 --workers 0 --masters 2").expect("valid create");
        let ClusterCmd::Create(opt) = cli.cmd else {
            panic!("expected create");
        };
        assert_eq!(opt.request().master_count, Some(2));
    }

    #[test]
    fn test_parse_peers() {
        assert!(matches!(parse("spark-cluster list").expect("list").cmd, ClusterCmd::List));
        assert!(matches!(
            parse("spark-cluster get c1").expect("get").cmd,
            ClusterCmd::Get { name } if name == "c1"
        ));
        assert!(matches!(
            parse("spark-cluster delete c1").expect("delete").cmd,
            ClusterCmd::Delete { .. }
        ));
        assert!(parse("spark-cluster create").is_err());
    }
}
