//! Stateful sets
//!
//! Ready once enough replicas report ready and every pod the set selects
//! is ready too.

use super::aggregate::pods_ready;
use super::replica_set::replica_verdict;
use super::{ClusterObject, StatusMeta};
use crate::kubernetes::{ClusterApi, K8sResult, ObjectApi};
use futures::future::{BoxFuture, FutureExt};
use k8s_openapi::api::apps::v1::StatefulSet;
use rollcall_common::{Kind, ResourceDefinition, Verdict};
use std::collections::BTreeMap;
use std::sync::Arc;

impl ClusterObject for StatefulSet {
    const KIND: Kind = Kind::StatefulSet;

    fn api(cluster: &dyn ClusterApi) -> Arc<dyn ObjectApi<Self>> {
        cluster.stateful_sets()
    }

    fn from_definition(definition: &ResourceDefinition) -> Option<&Self> {
        definition.stateful_set.as_ref()
    }

    fn readiness<'a>(
        name: &'a str,
        cluster: &'a Arc<dyn ClusterApi>,
        meta: &'a StatusMeta,
    ) -> BoxFuture<'a, K8sResult<Verdict>> {
        async move {
            let set = cluster.stateful_sets().get(name).await?;

            let desired = set.spec.as_ref().and_then(|spec| spec.replicas).unwrap_or(1);
            let ready = set
                .status
                .as_ref()
                .and_then(|status| status.ready_replicas)
                .unwrap_or(0);
            let verdict = replica_verdict(ready, desired, meta)?;
            if !verdict.is_ready() {
                return Ok(verdict);
            }

            pods_ready(&Self::KIND.key(name), &match_labels(&set), cluster).await
        }
        .boxed()
    }
}

/// Labels the set uses to address its pods
pub fn match_labels(set: &StatefulSet) -> BTreeMap<String, String> {
    set.spec
        .as_ref()
        .and_then(|spec| spec.selector.match_labels.clone())
        .unwrap_or_default()
}
