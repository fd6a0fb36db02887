//! Pet sets (legacy stateful workloads)
//!
//! Judged like stateful sets, except that the legacy status only reports
//! how many replicas exist.

use super::aggregate::pods_ready;
use super::replica_set::replica_verdict;
use super::{ClusterObject, StatusMeta};
use crate::kubernetes::{ClusterApi, K8sResult, ObjectApi};
use futures::future::{BoxFuture, FutureExt};
use rollcall_common::{Kind, PetSet, ResourceDefinition, Verdict};
use std::sync::Arc;

impl ClusterObject for PetSet {
    const KIND: Kind = Kind::PetSet;

    fn api(cluster: &dyn ClusterApi) -> Arc<dyn ObjectApi<Self>> {
        cluster.pet_sets()
    }

    fn from_definition(definition: &ResourceDefinition) -> Option<&Self> {
        definition.pet_set.as_ref()
    }

    fn readiness<'a>(
        name: &'a str,
        cluster: &'a Arc<dyn ClusterApi>,
        meta: &'a StatusMeta,
    ) -> BoxFuture<'a, K8sResult<Verdict>> {
        async move {
            let set = cluster.pet_sets().get(name).await?;

            let desired = set.spec.replicas.unwrap_or(1);
            let current = set
                .status
                .as_ref()
                .and_then(|status| status.replicas)
                .unwrap_or(0);
            let verdict = replica_verdict(current, desired, meta)?;
            if !verdict.is_ready() {
                return Ok(verdict);
            }

            let selector = set
                .spec
                .selector
                .as_ref()
                .and_then(|selector| selector.match_labels.clone())
                .unwrap_or_default();
            pods_ready(&Self::KIND.key(name), &selector, cluster).await
        }
        .boxed()
    }
}
