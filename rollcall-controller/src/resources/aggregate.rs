//! Readiness aggregation
//!
//! A composite resource is ready when every object it selects is ready.
//! Children are discovered by label, wrapped as existing resources and
//! evaluated in order; the first child that is not ready (or fails) decides
//! the outcome and nothing after it is queried. Children can be composites
//! themselves, so readiness is evaluated over the whole closure.

use super::compat::{list_stateful, StatefulGeneration};
use super::report::SimpleReporter;
use super::variant::Existing;
use super::{ClusterObject, Resource, StatusMeta, PARENT};
use crate::kubernetes::{ClusterApi, K8sResult, LabelQuery};
use kube::ResourceExt;
use rollcall_common::Verdict;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Wrap an observed child as a reported, existing resource
pub(crate) fn wrap_observed<K: ClusterObject>(
    object: &K,
    cluster: &Arc<dyn ClusterApi>,
) -> Box<dyn Resource> {
    SimpleReporter::wrap(Existing::<K>::new(object.name_any(), cluster.clone()))
}

/// Evaluate resources in order, stopping at the first one that is not ready
pub async fn resources_ready(
    resources: &[Box<dyn Resource>],
    meta: &StatusMeta,
) -> K8sResult<Verdict> {
    for resource in resources {
        let verdict = resource.status(meta).await?;
        if !verdict.is_ready() {
            tracing::debug!("{} is {}", resource.key(), verdict);
            return Ok(verdict);
        }
    }
    Ok(Verdict::Ready)
}

/// Readiness of everything `parent` selects, one selector entry at a time
///
/// Each `key=value` entry is queried on its own and its matches must all be
/// ready. Entries are not combined into a single AND query, so objects
/// matching only some of the entries still count.
pub async fn selector_ready(
    parent: &str,
    selector: &BTreeMap<String, String>,
    cluster: &Arc<dyn ClusterApi>,
) -> K8sResult<Verdict> {
    if selector.is_empty() {
        return Ok(Verdict::Ready);
    }

    tracing::debug!("Checking {} selector {:?}", parent, selector);
    let generation = StatefulGeneration::resolve(cluster.as_ref()).await?;
    let meta = child_meta(parent);

    for (key, value) in selector {
        let query = LabelQuery::term(key, value)?;
        tracing::debug!("Checking status for {}", query);

        let children = discover(cluster, &query, generation).await?;
        let verdict = resources_ready(&children, &meta).await?;
        if !verdict.is_ready() {
            return Ok(verdict);
        }
    }

    Ok(Verdict::Ready)
}

/// Readiness of the pods matching every entry of `selector` at once
pub async fn pods_ready(
    parent: &str,
    selector: &BTreeMap<String, String>,
    cluster: &Arc<dyn ClusterApi>,
) -> K8sResult<Verdict> {
    if selector.is_empty() {
        return Ok(Verdict::Ready);
    }

    let query = LabelQuery::from_map(selector)?;
    let pods: Vec<Box<dyn Resource>> = cluster
        .pods()
        .list(&query)
        .await?
        .iter()
        .map(|pod| wrap_observed(pod, cluster))
        .collect();

    resources_ready(&pods, &child_meta(parent)).await
}

/// Every child kind matching `query`: pods, jobs, replica sets, then the
/// stateful workloads of the given generation
pub async fn discover(
    cluster: &Arc<dyn ClusterApi>,
    query: &LabelQuery,
    generation: StatefulGeneration,
) -> K8sResult<Vec<Box<dyn Resource>>> {
    let pods = cluster.pods().list(query).await?;
    let jobs = cluster.jobs().list(query).await?;
    let replica_sets = cluster.replica_sets().list(query).await?;

    let mut children: Vec<Box<dyn Resource>> =
        Vec::with_capacity(pods.len() + jobs.len() + replica_sets.len());
    children.extend(pods.iter().map(|pod| wrap_observed(pod, cluster)));
    children.extend(jobs.iter().map(|job| wrap_observed(job, cluster)));
    children.extend(replica_sets.iter().map(|set| wrap_observed(set, cluster)));
    children.extend(list_stateful(cluster, query, generation).await?);

    Ok(children)
}

fn child_meta(parent: &str) -> StatusMeta {
    StatusMeta::from([(PARENT.to_string(), parent.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::{K8sError, MemoryCluster};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resource with a canned answer that counts how often it was asked
    struct Canned {
        name: &'static str,
        answer: fn() -> K8sResult<Verdict>,
        asked: Arc<AtomicUsize>,
    }

    impl Canned {
        fn boxed(
            name: &'static str,
            answer: fn() -> K8sResult<Verdict>,
        ) -> (Box<dyn Resource>, Arc<AtomicUsize>) {
            let asked = Arc::new(AtomicUsize::new(0));
            let resource = Box::new(Self {
                name,
                answer,
                asked: asked.clone(),
            });
            (resource, asked)
        }
    }

    #[async_trait]
    impl Resource for Canned {
        fn key(&self) -> String {
            format!("pod/{}", self.name)
        }

        async fn create(&mut self) -> K8sResult<()> {
            Ok(())
        }

        async fn delete(&self) -> K8sResult<()> {
            Ok(())
        }

        async fn status(&self, _meta: &StatusMeta) -> K8sResult<Verdict> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }
    }

    #[tokio::test]
    async fn test_empty_list_is_ready() {
        let verdict = resources_ready(&[], &StatusMeta::new()).await.unwrap();
        assert_eq!(verdict, Verdict::Ready);
    }

    #[tokio::test]
    async fn test_first_not_ready_short_circuits() {
        let (a, a_asked) = Canned::boxed("a", || Ok(Verdict::Ready));
        let (b, b_asked) = Canned::boxed("b", || Ok(Verdict::not_ready("pending")));
        let (c, c_asked) = Canned::boxed("c", || Ok(Verdict::Ready));

        let verdict = resources_ready(&[a, b, c], &StatusMeta::new()).await.unwrap();

        assert_eq!(verdict, Verdict::not_ready("pending"));
        assert_eq!(a_asked.load(Ordering::SeqCst), 1);
        assert_eq!(b_asked.load(Ordering::SeqCst), 1);
        assert_eq!(c_asked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_short_circuits() {
        let (a, _) = Canned::boxed("a", || Err(K8sError::Internal("boom".to_string())));
        let (b, b_asked) = Canned::boxed("b", || Ok(Verdict::Ready));

        let err = resources_ready(&[a, b], &StatusMeta::new()).await.unwrap_err();

        assert!(matches!(err, K8sError::Internal(_)));
        assert_eq!(b_asked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_verdict_is_propagated() {
        let (a, _) = Canned::boxed("a", || Ok(Verdict::failed("backoff limit exceeded")));
        let verdict = resources_ready(&[a], &StatusMeta::new()).await.unwrap();
        assert!(verdict.is_failed());
    }

    #[tokio::test]
    async fn test_empty_selector_issues_no_calls() {
        let memory = MemoryCluster::new();
        let cluster: Arc<dyn ClusterApi> = Arc::new(memory.clone());

        let verdict = selector_ready("service/x", &BTreeMap::new(), &cluster)
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Ready);
        assert!(memory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_selector_entry_is_hard_failure() {
        let memory = MemoryCluster::new();
        let cluster: Arc<dyn ClusterApi> = Arc::new(memory.clone());
        let selector = BTreeMap::from([("bad key!".to_string(), "web".to_string())]);

        let err = selector_ready("service/x", &selector, &cluster)
            .await
            .unwrap_err();

        assert!(matches!(err, K8sError::InvalidSelector(_)));
    }
}
