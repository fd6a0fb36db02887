//! Stateful workload generations
//!
//! Stateful replicas exist in two schema-incompatible generations:
//! StatefulSet (apps/v1) and its predecessor PetSet (apps/v1alpha1). A
//! cluster serves exactly one of them, so discovery asks the cluster once
//! per evaluation and then queries that generation only.

use super::aggregate::wrap_observed;
use super::Resource;
use crate::kubernetes::{ClusterApi, GroupVersion, K8sResult, LabelQuery};
use rollcall_common::Kind;
use std::sync::Arc;

/// Group/version whose presence selects the current generation
pub const STATEFUL_SET_API: GroupVersion = GroupVersion::new("apps", "v1");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatefulGeneration {
    /// StatefulSet
    Current,
    /// PetSet
    Legacy,
}

impl StatefulGeneration {
    /// Ask the cluster which generation it serves
    pub async fn resolve(cluster: &dyn ClusterApi) -> K8sResult<Self> {
        let generation = if cluster.is_enabled(&STATEFUL_SET_API).await? {
            Self::Current
        } else {
            Self::Legacy
        };
        tracing::debug!("Stateful workloads served as {}", generation.kind());
        Ok(generation)
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Current => Kind::StatefulSet,
            Self::Legacy => Kind::PetSet,
        }
    }
}

/// List stateful workloads matching `query` from the given generation only
pub async fn list_stateful(
    cluster: &Arc<dyn ClusterApi>,
    query: &LabelQuery,
    generation: StatefulGeneration,
) -> K8sResult<Vec<Box<dyn Resource>>> {
    let resources = match generation {
        StatefulGeneration::Current => cluster
            .stateful_sets()
            .list(query)
            .await?
            .iter()
            .map(|set| wrap_observed(set, cluster))
            .collect(),
        StatefulGeneration::Legacy => cluster
            .pet_sets()
            .list(query)
            .await?
            .iter()
            .map(|set| wrap_observed(set, cluster))
            .collect(),
    };
    Ok(resources)
}
