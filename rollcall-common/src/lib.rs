//! Common types shared between the rollcall controller and its tooling
//!
//! Nothing in here talks to a cluster: these are the resource definitions
//! the controller consumes, the kinds it knows about, and the readiness
//! verdicts it produces.

pub mod definition;
pub mod kind;
pub mod legacy;
pub mod verdict;

pub use definition::{definitions_from_yaml, Meta, ResourceDefinition};
pub use kind::Kind;
pub use legacy::{PetSet, PetSetSpec, PetSetStatus};
pub use verdict::Verdict;

use thiserror::Error;

/// Errors raised while interpreting resource definitions and keys
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("definition has no resource populated")]
    Empty,

    #[error("definition populates more than one resource: {0:?}")]
    Ambiguous(Vec<Kind>),

    #[error("{0} definition has no metadata.name")]
    MissingName(Kind),

    #[error("expected a {expected} definition, found {found}")]
    WrongKind { expected: Kind, found: Kind },

    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("malformed resource key: {0}")]
    MalformedKey(String),

    #[error("failed to parse definitions: {0}")]
    Parse(#[from] serde_yaml::Error),
}
