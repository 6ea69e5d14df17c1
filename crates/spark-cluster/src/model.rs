use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_MASTER_COUNT: i32 = 1;

/// Request to create a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRequest {
    pub name: String,
    pub worker_count: i32,
    /// accepted but only a single master is ever provisioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_count: Option<i32>,
}

impl ClusterRequest {
    pub fn new(name: impl Into<String>, worker_count: i32) -> Self {
        Self {
            name: name.into(),
            worker_count,
            master_count: None,
        }
    }

    pub fn with_master_count(mut self, master_count: i32) -> Self {
        self.master_count = Some(master_count);
        self
    }
}

/// Cluster as requested; does not reflect readiness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterModel {
    pub name: String,
    pub worker_count: i32,
    pub master_count: i32,
}

impl From<&ClusterRequest> for ClusterModel {
    fn from(request: &ClusterRequest) -> Self {
        Self {
            name: request.name.clone(),
            worker_count: request.worker_count,
            master_count: request.master_count.unwrap_or(DEFAULT_MASTER_COUNT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleCluster {
    pub cluster: ClusterModel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorModel {
    pub status: u16,
    pub title: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorModel>,
}

impl ErrorResponse {
    pub fn single(status: u16, title: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            errors: vec![ErrorModel {
                status,
                title: title.into(),
                details: details.into(),
            }],
        }
    }
}
