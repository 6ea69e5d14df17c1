use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;

/// label key used to select the pods of a workload
pub const SELECTOR_KEY: &str = "name";

/// Labels identifying the pods governed by a workload.
///
/// A workload owns its selector. Services exposing the workload must use
/// a clone of that same value, see [`expose_workload`](crate::expose_workload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PodSelector(BTreeMap<String, String>);

impl PodSelector {
    /// selector matching pods labelled `name=<workload name>`
    pub fn for_workload(workload_name: &str) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(SELECTOR_KEY.to_owned(), workload_name.to_owned());
        Self(labels)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn to_k8_labels(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_name_label() {
        let selector = PodSelector::for_workload("spark-master-c1");
        assert_eq!(selector.len(), 1);
        assert_eq!(selector.get(SELECTOR_KEY), Some("spark-master-c1"));
        assert_eq!(
            selector.iter().collect::<Vec<_>>(),
            vec![("name", "spark-master-c1")]
        );
    }

    #[test]
    fn test_k8_labels_match() {
        let selector = PodSelector::for_workload("spark-worker-c1");
        let labels = selector.to_k8_labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("name").map(|v| v.as_str()), Some("spark-worker-c1"));
    }
}
