//! In-memory cluster
//!
//! Implements the transport seam without a cluster: objects are kept per
//! kind, label queries are honoured, and not-found / already-exists are
//! reported the way the API server reports them. Every call is recorded so
//! callers can see exactly which round-trips an operation issued.
//!
//! Used by `rollcall --dry-run` and by the tests.

use super::api::{ClusterApi, GroupVersion, ObjectApi};
use super::error::{K8sError, K8sResult};
use super::selector::LabelQuery;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Pod, Service};
use kube::ResourceExt;
use rollcall_common::{Kind, PetSet};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const DEFAULT_NAMESPACE: &str = "default";

/// Kind of round-trip recorded by the memory cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    List,
    Create,
    Delete,
    Discover,
}

/// One recorded round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub verb: Verb,
    /// None for discovery calls
    pub kind: Option<Kind>,
    /// Object name, label query, or group/version
    pub target: String,
}

#[derive(Default)]
struct State {
    objects: HashMap<Kind, BTreeMap<String, serde_json::Value>>,
    enabled: HashSet<String>,
    calls: Vec<Call>,
}

/// Cluster state held in memory, cheap to clone and share
#[derive(Clone)]
pub struct MemoryCluster {
    namespace: String,
    state: Arc<Mutex<State>>,
}

impl MemoryCluster {
    /// Empty cluster serving the current stateful-workload API (apps/v1)
    pub fn new() -> Self {
        let mut state = State::default();
        state.enabled.insert("v1".to_string());
        state.enabled.insert("apps/v1".to_string());
        state.enabled.insert("batch/v1".to_string());

        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Empty cluster that only knows the legacy PetSet API (apps/v1alpha1)
    pub fn legacy() -> Self {
        let cluster = Self::new();
        cluster.set_enabled("apps/v1", false);
        cluster.set_enabled("apps/v1alpha1", true);
        cluster
    }

    /// Report objects as living in `namespace`
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Turn a group/version (e.g. "apps/v1") on or off
    pub fn set_enabled(&self, group_version: &str, enabled: bool) {
        let mut state = self.lock();
        if enabled {
            state.enabled.insert(group_version.to_string());
        } else {
            state.enabled.remove(group_version);
        }
    }

    /// Store an object as-is, replacing any object of the same name
    ///
    /// Not recorded as a call; this is how callers seed observed state.
    pub fn insert<K>(&self, kind: Kind, object: K) -> K8sResult<()>
    where
        K: kube::Resource + Serialize,
    {
        let name = object.name_any();
        let value = serde_json::to_value(&object)
            .map_err(|e| K8sError::Internal(format!("Failed to encode {}: {}", kind.key(&name), e)))?;
        self.lock().objects.entry(kind).or_default().insert(name, value);
        Ok(())
    }

    /// Read an object back without recording a call
    pub fn fetch<K>(&self, kind: Kind, name: &str) -> Option<K>
    where
        K: DeserializeOwned,
    {
        let state = self.lock();
        let value = state.objects.get(&kind)?.get(name)?.clone();
        serde_json::from_value(value).ok()
    }

    /// Number of stored objects of a kind
    pub fn count(&self, kind: Kind) -> usize {
        self.lock().objects.get(&kind).map_or(0, BTreeMap::len)
    }

    /// Every call recorded so far, oldest first
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Calls of one verb against one kind
    pub fn calls_for(&self, verb: Verb, kind: Kind) -> Vec<Call> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.verb == verb && call.kind == Some(kind))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn object_api<K>(&self, kind: Kind) -> Arc<dyn ObjectApi<K>>
    where
        K: kube::Resource + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        Arc::new(MemoryObjectApi {
            cluster: self.clone(),
            kind,
            _marker: PhantomData,
        })
    }
}

impl Default for MemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCluster")
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[async_trait]
impl ClusterApi for MemoryCluster {
    fn services(&self) -> Arc<dyn ObjectApi<Service>> {
        self.object_api(Kind::Service)
    }

    fn pods(&self) -> Arc<dyn ObjectApi<Pod>> {
        self.object_api(Kind::Pod)
    }

    fn jobs(&self) -> Arc<dyn ObjectApi<Job>> {
        self.object_api(Kind::Job)
    }

    fn replica_sets(&self) -> Arc<dyn ObjectApi<ReplicaSet>> {
        self.object_api(Kind::ReplicaSet)
    }

    fn stateful_sets(&self) -> Arc<dyn ObjectApi<StatefulSet>> {
        self.object_api(Kind::StatefulSet)
    }

    fn pet_sets(&self) -> Arc<dyn ObjectApi<PetSet>> {
        self.object_api(Kind::PetSet)
    }

    async fn is_enabled(&self, group_version: &GroupVersion) -> K8sResult<bool> {
        let target = group_version.to_string();
        let mut state = self.lock();
        state.calls.push(Call {
            verb: Verb::Discover,
            kind: None,
            target: target.clone(),
        });
        Ok(state.enabled.contains(&target))
    }
}

struct MemoryObjectApi<K> {
    cluster: MemoryCluster,
    kind: Kind,
    _marker: PhantomData<fn() -> K>,
}

impl<K> MemoryObjectApi<K>
where
    K: DeserializeOwned,
{
    fn record(&self, state: &mut State, verb: Verb, target: &str) {
        state.calls.push(Call {
            verb,
            kind: Some(self.kind),
            target: target.to_string(),
        });
    }

    fn not_found(&self, name: &str) -> K8sError {
        K8sError::ResourceNotFound {
            kind: self.kind,
            name: name.to_string(),
            namespace: self.cluster.namespace.clone(),
        }
    }

    fn decode(&self, value: serde_json::Value) -> K8sResult<K> {
        serde_json::from_value(value)
            .map_err(|e| K8sError::Internal(format!("Failed to decode stored {}: {}", self.kind, e)))
    }
}

#[async_trait]
impl<K> ObjectApi<K> for MemoryObjectApi<K>
where
    K: kube::Resource + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> K8sResult<K> {
        let value = {
            let mut state = self.cluster.lock();
            self.record(&mut state, Verb::Get, name);
            state
                .objects
                .get(&self.kind)
                .and_then(|objects| objects.get(name))
                .cloned()
        };

        match value {
            Some(value) => self.decode(value),
            None => Err(self.not_found(name)),
        }
    }

    async fn list(&self, query: &LabelQuery) -> K8sResult<Vec<K>> {
        let values: Vec<serde_json::Value> = {
            let mut state = self.cluster.lock();
            self.record(&mut state, Verb::List, &query.to_string());
            state
                .objects
                .get(&self.kind)
                .map(|objects| objects.values().cloned().collect())
                .unwrap_or_default()
        };

        let mut matched = Vec::new();
        for value in values {
            let object = self.decode(value)?;
            if query.matches(object.labels()) {
                matched.push(object);
            }
        }
        Ok(matched)
    }

    async fn create(&self, object: &K) -> K8sResult<K> {
        let name = object.name_any();
        if name.is_empty() {
            return Err(K8sError::Internal(format!(
                "Cannot create unnamed {}",
                self.kind
            )));
        }

        let mut state = self.cluster.lock();
        self.record(&mut state, Verb::Create, &name);

        if state
            .objects
            .get(&self.kind)
            .is_some_and(|objects| objects.contains_key(&name))
        {
            return Err(K8sError::AlreadyExists(self.kind.key(&name)));
        }

        let mut stored = object.clone();
        let meta = stored.meta_mut();
        meta.uid = Some(Uuid::new_v4().to_string());
        meta.resource_version = Some("1".to_string());
        meta.namespace = Some(self.cluster.namespace.clone());

        let value = serde_json::to_value(&stored)
            .map_err(|e| K8sError::Internal(format!("Failed to encode {}: {}", self.kind, e)))?;
        state.objects.entry(self.kind).or_default().insert(name, value);

        Ok(stored)
    }

    async fn delete(&self, name: &str) -> K8sResult<()> {
        let mut state = self.cluster.lock();
        self.record(&mut state, Verb::Delete, name);

        let removed = state
            .objects
            .get_mut(&self.kind)
            .and_then(|objects| objects.remove(name));

        match removed {
            Some(_) => Ok(()),
            None => Err(self.not_found(name)),
        }
    }
}
