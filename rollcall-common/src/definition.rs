//! Resource definitions
//!
//! A definition wraps exactly one Kubernetes object plus free-form metadata
//! (scheduling hints such as timeouts). Definitions are usually read from
//! multi-document YAML files.

use crate::{DefinitionError, Kind, PetSet};
use k8s_openapi::api::apps::v1::{ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Pod, Service};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Free-form definition metadata
pub type Meta = HashMap<String, serde_json::Value>;

/// Desired state of a single resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<Pod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,

    #[serde(default, rename = "replicaset", skip_serializing_if = "Option::is_none")]
    pub replica_set: Option<ReplicaSet>,

    #[serde(default, rename = "statefulset", skip_serializing_if = "Option::is_none")]
    pub stateful_set: Option<StatefulSet>,

    #[serde(default, rename = "petset", skip_serializing_if = "Option::is_none")]
    pub pet_set: Option<PetSet>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta: Meta,
}

impl ResourceDefinition {
    /// Kinds whose field is populated, in `Kind::ALL` order
    pub fn populated_kinds(&self) -> Vec<Kind> {
        Kind::ALL
            .into_iter()
            .filter(|kind| self.object_name(*kind).is_some())
            .collect()
    }

    /// The single populated kind
    ///
    /// Fails when nothing or more than one field is populated.
    pub fn kind(&self) -> Result<Kind, DefinitionError> {
        let kinds = self.populated_kinds();
        match kinds.as_slice() {
            [] => Err(DefinitionError::Empty),
            [kind] => Ok(*kind),
            _ => Err(DefinitionError::Ambiguous(kinds)),
        }
    }

    /// Name of the populated object
    pub fn name(&self) -> Result<&str, DefinitionError> {
        let kind = self.kind()?;
        self.object_name(kind)
            .and_then(|name| name)
            .ok_or(DefinitionError::MissingName(kind))
    }

    /// Key of the populated object (`"<kind>/<name>"`)
    pub fn key(&self) -> Result<String, DefinitionError> {
        let kind = self.kind()?;
        Ok(kind.key(self.name()?))
    }

    /// Look up a metadata hint
    pub fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.meta.get(key)
    }

    // Outer None: field not populated. Inner None: populated but unnamed.
    fn object_name(&self, kind: Kind) -> Option<Option<&str>> {
        match kind {
            Kind::Service => self.service.as_ref().map(|o| o.metadata.name.as_deref()),
            Kind::Pod => self.pod.as_ref().map(|o| o.metadata.name.as_deref()),
            Kind::Job => self.job.as_ref().map(|o| o.metadata.name.as_deref()),
            Kind::ReplicaSet => self.replica_set.as_ref().map(|o| o.metadata.name.as_deref()),
            Kind::StatefulSet => self.stateful_set.as_ref().map(|o| o.metadata.name.as_deref()),
            Kind::PetSet => self.pet_set.as_ref().map(|o| o.metadata.name.as_deref()),
        }
    }
}

/// Parse every YAML document in `input` as a definition
pub fn definitions_from_yaml(input: &str) -> Result<Vec<ResourceDefinition>, DefinitionError> {
    let mut definitions = Vec::new();
    for document in serde_yaml::Deserializer::from_str(input) {
        let value = serde_yaml::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        definitions.push(serde_yaml::from_value(value)?);
    }
    Ok(definitions)
}
