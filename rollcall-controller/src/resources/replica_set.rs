//! Replica sets

use super::{required_replicas, ClusterObject, StatusMeta};
use crate::kubernetes::{ClusterApi, K8sResult, ObjectApi};
use futures::future::{BoxFuture, FutureExt};
use k8s_openapi::api::apps::v1::ReplicaSet;
use rollcall_common::{Kind, ResourceDefinition, Verdict};
use std::sync::Arc;

impl ClusterObject for ReplicaSet {
    const KIND: Kind = Kind::ReplicaSet;

    fn api(cluster: &dyn ClusterApi) -> Arc<dyn ObjectApi<Self>> {
        cluster.replica_sets()
    }

    fn from_definition(definition: &ResourceDefinition) -> Option<&Self> {
        definition.replica_set.as_ref()
    }

    fn readiness<'a>(
        name: &'a str,
        cluster: &'a Arc<dyn ClusterApi>,
        meta: &'a StatusMeta,
    ) -> BoxFuture<'a, K8sResult<Verdict>> {
        async move {
            let set = cluster.replica_sets().get(name).await?;
            replica_set_verdict(&set, meta)
        }
        .boxed()
    }
}

/// Judge a replica set by its ready replicas
pub fn replica_set_verdict(set: &ReplicaSet, meta: &StatusMeta) -> K8sResult<Verdict> {
    let desired = set.spec.as_ref().and_then(|spec| spec.replicas).unwrap_or(1);
    let ready = set
        .status
        .as_ref()
        .and_then(|status| status.ready_replicas)
        .unwrap_or(0);

    replica_verdict(ready, desired, meta)
}

/// Shared replica-count rule for replica sets and stateful workloads
pub(crate) fn replica_verdict(ready: i32, desired: i32, meta: &StatusMeta) -> K8sResult<Verdict> {
    let required = required_replicas(desired, meta)?;
    if ready >= required {
        Ok(Verdict::Ready)
    } else {
        Ok(Verdict::not_ready(format!(
            "{}/{} replicas ready, {} required",
            ready, desired, required
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::SUCCESS_FACTOR;
    use k8s_openapi::api::apps::v1::{ReplicaSetSpec, ReplicaSetStatus};

    fn set(desired: i32, ready: i32) -> ReplicaSet {
        ReplicaSet {
            spec: Some(ReplicaSetSpec {
                replicas: Some(desired),
                ..Default::default()
            }),
            status: Some(ReplicaSetStatus {
                replicas: desired,
                ready_replicas: Some(ready),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_replicas_required_by_default() {
        let meta = StatusMeta::new();
        assert_eq!(replica_set_verdict(&set(3, 3), &meta).unwrap(), Verdict::Ready);
        assert_eq!(
            replica_set_verdict(&set(3, 2), &meta).unwrap(),
            Verdict::not_ready("2/3 replicas ready, 3 required")
        );
    }

    #[test]
    fn test_success_factor_accepts_partial_readiness() {
        let meta = StatusMeta::from([(SUCCESS_FACTOR.to_string(), "60".to_string())]);
        assert_eq!(replica_set_verdict(&set(5, 3), &meta).unwrap(), Verdict::Ready);
        assert!(!replica_set_verdict(&set(5, 2), &meta).unwrap().is_ready());
    }

    #[test]
    fn test_missing_status_counts_as_zero_ready() {
        let meta = StatusMeta::new();
        assert!(!replica_set_verdict(&ReplicaSet::default(), &meta)
            .unwrap()
            .is_ready());
    }
}
