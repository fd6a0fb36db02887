//! Kubernetes client wrapper
//!
//! Wraps the kube-rs Client with a target namespace and implements the
//! cluster transport seam on top of it.

use super::api::{ClusterApi, GroupVersion, ObjectApi};
use super::error::{K8sError, K8sResult};
use super::selector::LabelQuery;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Pod, Service};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::{Client, Config};
use rollcall_common::PetSet;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

/// Wrapper around kube-rs Client with namespace context
#[derive(Clone)]
pub struct K8sClient {
    inner: Client,
    namespace: String,
    api_server: String,
}

impl K8sClient {
    /// Create client from a kubeconfig file with optional context
    pub async fn from_kubeconfig(
        path: &Path,
        context: Option<&str>,
        namespace: Option<&str>,
    ) -> K8sResult<Self> {
        use kube::config::{KubeConfigOptions, Kubeconfig};

        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
            K8sError::InvalidKubeconfig(format!(
                "Failed to read kubeconfig {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: context.map(String::from),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| K8sError::InvalidKubeconfig(format!("Failed to create config: {}", e)))?;

        Self::from_config(config, namespace)
    }

    /// Create client from a named context of the default kubeconfig
    pub async fn from_context(context: &str, namespace: Option<&str>) -> K8sResult<Self> {
        use kube::config::KubeConfigOptions;

        let config = Config::from_kubeconfig(&KubeConfigOptions {
            context: Some(context.to_string()),
            ..Default::default()
        })
        .await
        .map_err(|e| {
            K8sError::InvalidKubeconfig(format!("Failed to load context {}: {}", context, e))
        })?;

        Self::from_config(config, namespace)
    }

    /// Create client from in-cluster configuration (for running inside K8s)
    pub fn from_incluster(namespace: Option<&str>) -> K8sResult<Self> {
        let config = Config::incluster().map_err(|e| {
            K8sError::InvalidKubeconfig(format!("Failed to get in-cluster config: {}", e))
        })?;

        Self::from_config(config, namespace)
    }

    /// Create client the way kubectl would: KUBECONFIG, ~/.kube/config, then in-cluster
    pub async fn infer(namespace: Option<&str>) -> K8sResult<Self> {
        let config = Config::infer().await.map_err(|e| {
            K8sError::InvalidKubeconfig(format!("Failed to infer config: {}", e))
        })?;

        Self::from_config(config, namespace)
    }

    fn from_config(config: Config, namespace: Option<&str>) -> K8sResult<Self> {
        let api_server = config.cluster_url.to_string();
        let namespace = namespace
            .map(String::from)
            .unwrap_or_else(|| config.default_namespace.clone());

        let client = Client::try_from(config)
            .map_err(|e| K8sError::InvalidKubeconfig(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            inner: client,
            namespace,
            api_server,
        })
    }

    /// Namespace every typed accessor is scoped to
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get API server URL
    pub fn api_server(&self) -> &str {
        &self.api_server
    }

    /// Get Kubernetes version string, e.g. "1.32"
    pub async fn server_version(&self) -> K8sResult<String> {
        let version = self.inner.apiserver_version().await?;
        Ok(format!("{}.{}", version.major, version.minor))
    }

    fn object_api<K>(&self) -> Arc<dyn ObjectApi<K>>
    where
        K: kube::Resource<Scope = NamespaceResourceScope>
            + Clone
            + DeserializeOwned
            + Serialize
            + Debug
            + Send
            + Sync
            + 'static,
        K::DynamicType: Default,
    {
        Arc::new(KubeObjectApi {
            api: Api::namespaced(self.inner.clone(), &self.namespace),
        })
    }
}

#[async_trait]
impl ClusterApi for K8sClient {
    fn services(&self) -> Arc<dyn ObjectApi<Service>> {
        self.object_api()
    }

    fn pods(&self) -> Arc<dyn ObjectApi<Pod>> {
        self.object_api()
    }

    fn jobs(&self) -> Arc<dyn ObjectApi<Job>> {
        self.object_api()
    }

    fn replica_sets(&self) -> Arc<dyn ObjectApi<ReplicaSet>> {
        self.object_api()
    }

    fn stateful_sets(&self) -> Arc<dyn ObjectApi<StatefulSet>> {
        self.object_api()
    }

    fn pet_sets(&self) -> Arc<dyn ObjectApi<PetSet>> {
        self.object_api()
    }

    async fn is_enabled(&self, group_version: &GroupVersion) -> K8sResult<bool> {
        if group_version.group.is_empty() {
            let core = self.inner.list_core_api_versions().await?;
            return Ok(core.versions.iter().any(|v| v == group_version.version));
        }

        let groups = self.inner.list_api_groups().await?;
        let enabled = groups.groups.iter().any(|group| {
            group.name == group_version.group
                && group
                    .versions
                    .iter()
                    .any(|v| v.version == group_version.version)
        });

        tracing::debug!("API {} enabled: {}", group_version, enabled);
        Ok(enabled)
    }
}

impl std::fmt::Debug for K8sClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("K8sClient")
            .field("namespace", &self.namespace)
            .field("api_server", &self.api_server)
            .finish()
    }
}

/// kube-rs backed accessor for one kind
struct KubeObjectApi<K> {
    api: Api<K>,
}

#[async_trait]
impl<K> ObjectApi<K> for KubeObjectApi<K>
where
    K: kube::Resource + Clone + DeserializeOwned + Serialize + Debug + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> K8sResult<K> {
        Ok(self.api.get(name).await?)
    }

    async fn list(&self, query: &LabelQuery) -> K8sResult<Vec<K>> {
        let mut lp = ListParams::default();
        if !query.is_empty() {
            lp = lp.labels(&query.to_string());
        }
        Ok(self.api.list(&lp).await?.items)
    }

    async fn create(&self, object: &K) -> K8sResult<K> {
        Ok(self.api.create(&PostParams::default(), object).await?)
    }

    async fn delete(&self, name: &str) -> K8sResult<()> {
        self.api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }
}
