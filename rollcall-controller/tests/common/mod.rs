//! Common test utilities and helpers

#![allow(dead_code)]

use k8s_openapi::api::apps::v1::{
    ReplicaSet, ReplicaSetSpec, ReplicaSetStatus, StatefulSet, StatefulSetSpec, StatefulSetStatus,
};
use k8s_openapi::api::batch::v1::{Job, JobCondition, JobStatus};
use k8s_openapi::api::core::v1::{Pod, PodCondition, PodStatus, Service, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use rollcall_common::{Kind, PetSet, PetSetSpec, PetSetStatus};
use rollcall_controller::kubernetes::memory::{Call, Verb};
use rollcall_controller::{ClusterApi, MemoryCluster};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Memory cluster plus the shared handle resources are built with
pub struct TestCluster {
    pub memory: MemoryCluster,
    pub cluster: Arc<dyn ClusterApi>,
}

impl TestCluster {
    pub fn new() -> Self {
        Self::from_memory(MemoryCluster::new())
    }

    /// Cluster serving PetSets instead of StatefulSets
    pub fn legacy() -> Self {
        Self::from_memory(MemoryCluster::legacy())
    }

    fn from_memory(memory: MemoryCluster) -> Self {
        let cluster: Arc<dyn ClusterApi> = Arc::new(memory.clone());
        Self { memory, cluster }
    }

    pub fn handle(&self) -> Arc<dyn ClusterApi> {
        self.cluster.clone()
    }

    /// Seed an object without recording a call
    pub fn seed<K>(&self, kind: Kind, object: K)
    where
        K: kube::Resource + serde::Serialize,
    {
        self.memory.insert(kind, object).expect("seed object");
    }

    /// Names fetched individually for a kind, in call order
    pub fn gets(&self, kind: Kind) -> Vec<String> {
        targets(self.memory.calls_for(Verb::Get, kind))
    }

    /// Label queries issued for a kind, in call order
    pub fn lists(&self, kind: Kind) -> Vec<String> {
        targets(self.memory.calls_for(Verb::List, kind))
    }

    pub fn discoveries(&self) -> usize {
        self.memory
            .calls()
            .iter()
            .filter(|call| call.verb == Verb::Discover)
            .count()
    }
}

fn targets(calls: Vec<Call>) -> Vec<String> {
    calls.into_iter().map(|call| call.target).collect()
}

pub fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn metadata(name: &str, pairs: &[(&str, &str)]) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        labels: if pairs.is_empty() {
            None
        } else {
            Some(labels(pairs))
        },
        ..Default::default()
    }
}

pub fn service(name: &str, selector: &[(&str, &str)]) -> Service {
    Service {
        metadata: metadata(name, &[]),
        spec: Some(ServiceSpec {
            selector: if selector.is_empty() {
                None
            } else {
                Some(labels(selector))
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Pod in `phase`; running pods get a Ready condition when `ready`
pub fn pod(name: &str, pairs: &[(&str, &str)], phase: &str, ready: bool) -> Pod {
    Pod {
        metadata: metadata(name, pairs),
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            conditions: Some(vec![PodCondition {
                type_: "Ready".to_string(),
                status: if ready { "True" } else { "False" }.to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn ready_pod(name: &str, pairs: &[(&str, &str)]) -> Pod {
    pod(name, pairs, "Running", true)
}

pub fn pending_pod(name: &str, pairs: &[(&str, &str)]) -> Pod {
    pod(name, pairs, "Pending", false)
}

pub fn completed_job(name: &str, pairs: &[(&str, &str)]) -> Job {
    Job {
        metadata: metadata(name, pairs),
        status: Some(JobStatus {
            succeeded: Some(1),
            conditions: Some(vec![JobCondition {
                type_: "Complete".to_string(),
                status: "True".to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn failed_job(name: &str, pairs: &[(&str, &str)]) -> Job {
    Job {
        metadata: metadata(name, pairs),
        status: Some(JobStatus {
            failed: Some(6),
            conditions: Some(vec![JobCondition {
                type_: "Failed".to_string(),
                status: "True".to_string(),
                reason: Some("BackoffLimitExceeded".to_string()),
                message: Some("Job has reached the specified backoff limit".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn replica_set(name: &str, pairs: &[(&str, &str)], desired: i32, ready: i32) -> ReplicaSet {
    ReplicaSet {
        metadata: metadata(name, pairs),
        spec: Some(ReplicaSetSpec {
            replicas: Some(desired),
            ..Default::default()
        }),
        status: Some(ReplicaSetStatus {
            replicas: desired,
            ready_replicas: Some(ready),
            ..Default::default()
        }),
    }
}

/// Stateful set selecting its pods by `pod_labels`
pub fn stateful_set(
    name: &str,
    pairs: &[(&str, &str)],
    pod_labels: &[(&str, &str)],
    desired: i32,
    ready: i32,
) -> StatefulSet {
    StatefulSet {
        metadata: metadata(name, pairs),
        spec: Some(StatefulSetSpec {
            replicas: Some(desired),
            selector: LabelSelector {
                match_labels: Some(labels(pod_labels)),
                ..Default::default()
            },
            ..Default::default()
        }),
        status: Some(StatefulSetStatus {
            replicas: desired,
            ready_replicas: Some(ready),
            ..Default::default()
        }),
    }
}

pub fn pet_set(name: &str, pairs: &[(&str, &str)], desired: i32, current: i32) -> PetSet {
    let mut set = PetSet::new(
        name,
        PetSetSpec {
            replicas: Some(desired),
            ..Default::default()
        },
    );
    set.metadata.labels = Some(labels(pairs));
    set.status = Some(PetSetStatus {
        replicas: Some(current),
        ..Default::default()
    });
    set
}
