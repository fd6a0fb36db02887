//! Pods
//!
//! A pod is ready once it has run to completion, or while it is running
//! with its Ready condition set.

use super::{ClusterObject, StatusMeta};
use crate::kubernetes::{ClusterApi, K8sResult, ObjectApi};
use futures::future::{BoxFuture, FutureExt};
use k8s_openapi::api::core::v1::Pod;
use rollcall_common::{Kind, ResourceDefinition, Verdict};
use std::sync::Arc;

impl ClusterObject for Pod {
    const KIND: Kind = Kind::Pod;

    fn api(cluster: &dyn ClusterApi) -> Arc<dyn ObjectApi<Self>> {
        cluster.pods()
    }

    fn from_definition(definition: &ResourceDefinition) -> Option<&Self> {
        definition.pod.as_ref()
    }

    fn readiness<'a>(
        name: &'a str,
        cluster: &'a Arc<dyn ClusterApi>,
        _meta: &'a StatusMeta,
    ) -> BoxFuture<'a, K8sResult<Verdict>> {
        async move {
            let pod = cluster.pods().get(name).await?;
            Ok(pod_verdict(&pod))
        }
        .boxed()
    }
}

/// Judge a pod from its observed status
pub fn pod_verdict(pod: &Pod) -> Verdict {
    let Some(status) = pod.status.as_ref() else {
        return Verdict::not_ready("pod has no status yet");
    };

    match status.phase.as_deref() {
        Some("Succeeded") => Verdict::Ready,
        Some("Failed") => Verdict::failed(
            status
                .message
                .clone()
                .or_else(|| status.reason.clone())
                .unwrap_or_else(|| "pod failed".to_string()),
        ),
        Some("Running") => {
            let ready = status
                .conditions
                .as_ref()
                .is_some_and(|conditions| {
                    conditions
                        .iter()
                        .any(|c| c.type_ == "Ready" && c.status == "True")
                });
            if ready {
                Verdict::Ready
            } else {
                Verdict::not_ready("pod is running but not ready")
            }
        }
        Some(phase) => Verdict::not_ready(format!("pod phase is {}", phase)),
        None => Verdict::not_ready("pod phase is unknown"),
    }
}
