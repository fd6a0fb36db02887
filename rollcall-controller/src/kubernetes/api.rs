//! Cluster transport seam
//!
//! The engine only ever talks to a cluster through these traits. `K8sClient`
//! implements them over kube-rs; `MemoryCluster` implements them in memory.

use super::error::K8sResult;
use super::selector::LabelQuery;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Pod, Service};
use rollcall_common::PetSet;
use std::sync::Arc;

/// Typed accessor for one object kind in one namespace
#[async_trait]
pub trait ObjectApi<K>: Send + Sync {
    async fn get(&self, name: &str) -> K8sResult<K>;

    async fn list(&self, query: &LabelQuery) -> K8sResult<Vec<K>>;

    /// Create `object`, returning the object as stored by the cluster
    async fn create(&self, object: &K) -> K8sResult<K>;

    async fn delete(&self, name: &str) -> K8sResult<()>;
}

/// API group and version, e.g. `apps/v1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupVersion {
    /// Empty for the core group
    pub group: &'static str,
    pub version: &'static str,
}

impl GroupVersion {
    pub const fn new(group: &'static str, version: &'static str) -> Self {
        Self { group, version }
    }
}

impl std::fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.group.is_empty() {
            f.write_str(self.version)
        } else {
            write!(f, "{}/{}", self.group, self.version)
        }
    }
}

/// Handle to everything the engine needs from a cluster
#[async_trait]
pub trait ClusterApi: Send + Sync {
    fn services(&self) -> Arc<dyn ObjectApi<Service>>;

    fn pods(&self) -> Arc<dyn ObjectApi<Pod>>;

    fn jobs(&self) -> Arc<dyn ObjectApi<Job>>;

    fn replica_sets(&self) -> Arc<dyn ObjectApi<ReplicaSet>>;

    fn stateful_sets(&self) -> Arc<dyn ObjectApi<StatefulSet>>;

    fn pet_sets(&self) -> Arc<dyn ObjectApi<PetSet>>;

    /// Whether the cluster serves `group_version`
    async fn is_enabled(&self, group_version: &GroupVersion) -> K8sResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_version_display() {
        assert_eq!(GroupVersion::new("apps", "v1").to_string(), "apps/v1");
        assert_eq!(GroupVersion::new("", "v1").to_string(), "v1");
    }
}
