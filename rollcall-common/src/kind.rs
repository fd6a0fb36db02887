//! Resource kinds and their keys
//!
//! A key is `"<prefix>/<name>"`, e.g. `service/frontend`. The prefix is
//! unique per kind so keys never collide across kinds.

use crate::DefinitionError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Every resource kind the controller can manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Service,
    Pod,
    Job,
    ReplicaSet,
    StatefulSet,
    /// Legacy predecessor of StatefulSet (apps/v1alpha1)
    PetSet,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::Service,
        Kind::Pod,
        Kind::Job,
        Kind::ReplicaSet,
        Kind::StatefulSet,
        Kind::PetSet,
    ];

    /// Key prefix for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Pod => "pod",
            Self::Job => "job",
            Self::ReplicaSet => "replicaset",
            Self::StatefulSet => "statefulset",
            Self::PetSet => "petset",
        }
    }

    /// Build the stable key for an object of this kind
    pub fn key(&self, name: &str) -> String {
        format!("{}/{}", self.prefix(), name)
    }

    /// Split a `"<kind>/<name>"` key into its kind and name
    pub fn parse_key(key: &str) -> Result<(Kind, &str), DefinitionError> {
        let (prefix, name) = key
            .split_once('/')
            .ok_or_else(|| DefinitionError::MalformedKey(key.to_string()))?;

        if name.is_empty() || name.contains('/') {
            return Err(DefinitionError::MalformedKey(key.to_string()));
        }

        Ok((prefix.parse()?, name))
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Kind {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.prefix() == s)
            .ok_or_else(|| DefinitionError::UnknownKind(s.to_string()))
    }
}
