//! Managed and existing variants
//!
//! Both variants are generic over [`ClusterObject`], so every kind gets the
//! pair for free and only has to describe how its readiness is judged.

use super::creation::create_if_absent;
use super::{Base, ClusterObject, Resource, StatusMeta};
use crate::kubernetes::{ClusterApi, K8sResult};
use async_trait::async_trait;
use kube::ResourceExt;
use rollcall_common::{Meta, Verdict};
use std::marker::PhantomData;
use std::sync::Arc;

/// Resource built from a full definition
pub struct Managed<K: ClusterObject> {
    base: Base,
    object: K,
    cluster: Arc<dyn ClusterApi>,
}

impl<K: ClusterObject> Managed<K> {
    pub fn new(object: K, cluster: Arc<dyn ClusterApi>, meta: Meta) -> Self {
        Self {
            base: Base::new(meta),
            object,
            cluster,
        }
    }

    /// Desired state, or the cluster's copy once `create` provisioned it
    pub fn object(&self) -> &K {
        &self.object
    }

    pub fn name(&self) -> String {
        self.object.name_any()
    }
}

#[async_trait]
impl<K: ClusterObject> Resource for Managed<K> {
    fn key(&self) -> String {
        K::KIND.key(&self.name())
    }

    async fn create(&mut self) -> K8sResult<()> {
        let api = K::api(self.cluster.as_ref());
        create_if_absent(api.as_ref(), K::KIND, &mut self.object).await
    }

    async fn delete(&self) -> K8sResult<()> {
        K::api(self.cluster.as_ref()).delete(&self.name()).await
    }

    async fn status(&self, meta: &StatusMeta) -> K8sResult<Verdict> {
        let name = self.name();
        K::readiness(&name, &self.cluster, meta).await
    }

    fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.base.meta(key)
    }
}

/// Resource referring to an object by name only
///
/// The object is assumed to be provisioned by someone else, so `create`
/// never touches the cluster.
pub struct Existing<K: ClusterObject> {
    name: String,
    cluster: Arc<dyn ClusterApi>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ClusterObject> Existing<K> {
    pub fn new(name: impl Into<String>, cluster: Arc<dyn ClusterApi>) -> Self {
        Self {
            name: name.into(),
            cluster,
            _kind: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl<K: ClusterObject> Resource for Existing<K> {
    fn key(&self) -> String {
        K::KIND.key(&self.name)
    }

    async fn create(&mut self) -> K8sResult<()> {
        tracing::debug!("Not creating existing resource {}", self.key());
        Ok(())
    }

    async fn delete(&self) -> K8sResult<()> {
        K::api(self.cluster.as_ref()).delete(&self.name).await
    }

    async fn status(&self, meta: &StatusMeta) -> K8sResult<Verdict> {
        K::readiness(&self.name, &self.cluster, meta).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::memory::{MemoryCluster, Verb};
    use k8s_openapi::api::core::v1::Pod;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use rollcall_common::Kind;

    fn pod(name: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_managed_create_is_idempotent() {
        let cluster = MemoryCluster::new();
        let shared: Arc<dyn ClusterApi> = Arc::new(cluster.clone());
        let mut resource = Managed::new(pod("web-0"), shared, Meta::new());

        resource.create().await.unwrap();
        let uid = resource.object().metadata.uid.clone();
        assert!(uid.is_some());

        resource.create().await.unwrap();
        assert_eq!(resource.object().metadata.uid, uid);
        assert_eq!(cluster.calls_for(Verb::Create, Kind::Pod).len(), 1);
        assert_eq!(cluster.count(Kind::Pod), 1);
    }

    #[tokio::test]
    async fn test_existing_create_never_calls_cluster() {
        let cluster = MemoryCluster::new();
        let mut resource: Existing<Pod> = Existing::new("anything-at-all", Arc::new(cluster.clone()));

        resource.create().await.unwrap();
        assert_eq!(resource.key(), "pod/anything-at-all");
        assert!(cluster.calls().is_empty());
        assert_eq!(cluster.count(Kind::Pod), 0);
    }

    #[tokio::test]
    async fn test_delete_passes_not_found_through() {
        let cluster = MemoryCluster::new();
        let resource: Existing<Pod> = Existing::new("ghost", Arc::new(cluster));
        assert!(resource.delete().await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_managed_exposes_definition_meta() {
        let meta = Meta::from([("timeout".to_string(), serde_json::json!(30))]);
        let resource = Managed::new(pod("web-0"), Arc::new(MemoryCluster::new()), meta);
        assert_eq!(resource.meta("timeout"), Some(&serde_json::json!(30)));
        assert_eq!(resource.meta("missing"), None);
        assert_eq!(resource.key(), "pod/web-0");
    }
}
