//! Resource engine
//!
//! Every kind the controller manages is driven through the [`Resource`]
//! trait. Each kind comes in two variants:
//!
//! - [`Managed`]: built from a full definition; creates, deletes, observes.
//! - [`Existing`]: built from a name only; observes and deletes, and treats
//!   creation as already done.
//!
//! Composite kinds (services, stateful workloads) are ready only when
//! everything they select is ready; see [`aggregate`].

pub mod aggregate;
pub mod compat;
pub mod creation;
pub mod job;
pub mod pet_set;
pub mod pod;
pub mod registry;
pub mod replica_set;
pub mod report;
pub mod service;
pub mod stateful_set;
pub mod variant;

use crate::kubernetes::{ClusterApi, K8sError, K8sResult, ObjectApi};
use async_trait::async_trait;
use futures::future::BoxFuture;
use rollcall_common::{Kind, Meta, ResourceDefinition, Verdict};
use std::collections::HashMap;
use std::sync::Arc;

pub use registry::{templates, ResourceTemplate};
pub use report::SimpleReporter;
pub use variant::{Existing, Managed};

/// Caller-supplied hints for a status check
///
/// Unknown keys are ignored.
pub type StatusMeta = HashMap<String, String>;

/// Hint: percentage of replicas that must be ready (1..=100)
pub const SUCCESS_FACTOR: &str = "success_factor";

/// Hint: key of the composite resource asking for the status
pub const PARENT: &str = "parent";

/// Uniform lifecycle of a cluster resource
#[async_trait]
pub trait Resource: Send + Sync {
    /// Stable `"<kind>/<name>"` identifier
    fn key(&self) -> String;

    /// Create the object unless it already exists
    async fn create(&mut self) -> K8sResult<()>;

    /// Delete the object; errors from the cluster are passed through
    async fn delete(&self) -> K8sResult<()>;

    /// Evaluate readiness of the object and everything it depends on
    async fn status(&self, meta: &StatusMeta) -> K8sResult<Verdict>;

    /// Definition metadata hint, if the resource was built from a definition
    fn meta(&self, _key: &str) -> Option<&serde_json::Value> {
        None
    }
}

/// Metadata shared by every managed variant
#[derive(Debug, Clone, Default)]
pub struct Base {
    meta: Meta,
}

impl Base {
    pub fn new(meta: Meta) -> Self {
        Self { meta }
    }

    pub fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.meta.get(key)
    }
}

/// Per-kind behaviour behind the generic [`Managed`] and [`Existing`] variants
pub trait ClusterObject:
    kube::Resource<DynamicType = ()> + Clone + Send + Sync + 'static
{
    const KIND: Kind;

    /// Typed accessor for this kind
    fn api(cluster: &dyn ClusterApi) -> Arc<dyn ObjectApi<Self>>;

    /// This kind's object inside a definition, if populated
    fn from_definition(definition: &ResourceDefinition) -> Option<&Self>;

    /// Readiness of the named object as currently observed
    fn readiness<'a>(
        name: &'a str,
        cluster: &'a Arc<dyn ClusterApi>,
        meta: &'a StatusMeta,
    ) -> BoxFuture<'a, K8sResult<Verdict>>;
}

/// Number of replicas that must be ready given the `success_factor` hint
pub(crate) fn required_replicas(desired: i32, meta: &StatusMeta) -> K8sResult<i32> {
    let Some(raw) = meta.get(SUCCESS_FACTOR) else {
        return Ok(desired);
    };

    let factor: i64 = raw.trim().parse().map_err(|_| K8sError::InvalidMeta {
        key: SUCCESS_FACTOR.to_string(),
        value: raw.clone(),
        reason: "not an integer".to_string(),
    })?;

    if !(1..=100).contains(&factor) {
        return Err(K8sError::InvalidMeta {
            key: SUCCESS_FACTOR.to_string(),
            value: raw.clone(),
            reason: "must be between 1 and 100".to_string(),
        });
    }

    // ceil(desired * factor / 100)
    let desired = i64::from(desired.max(0));
    Ok(((desired * factor + 99) / 100) as i32)
}
