//! Services
//!
//! A service is the composite kind: it owns nothing itself and is ready
//! when everything its selector addresses is ready.

use super::aggregate::selector_ready;
use super::{ClusterObject, StatusMeta};
use crate::kubernetes::{ClusterApi, K8sResult, ObjectApi};
use futures::future::{BoxFuture, FutureExt};
use k8s_openapi::api::core::v1::Service;
use rollcall_common::{Kind, ResourceDefinition, Verdict};
use std::sync::Arc;

impl ClusterObject for Service {
    const KIND: Kind = Kind::Service;

    fn api(cluster: &dyn ClusterApi) -> Arc<dyn ObjectApi<Self>> {
        cluster.services()
    }

    fn from_definition(definition: &ResourceDefinition) -> Option<&Self> {
        definition.service.as_ref()
    }

    fn readiness<'a>(
        name: &'a str,
        cluster: &'a Arc<dyn ClusterApi>,
        _meta: &'a StatusMeta,
    ) -> BoxFuture<'a, K8sResult<Verdict>> {
        async move {
            // A service that was never created has no selector to follow
            let service = cluster.services().get(name).await?;
            let selector = service
                .spec
                .and_then(|spec| spec.selector)
                .unwrap_or_default();

            selector_ready(&Self::KIND.key(name), &selector, cluster).await
        }
        .boxed()
    }
}
