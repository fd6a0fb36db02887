//! Kubernetes error types
//!
//! Not-found and already-exists are the only conditions the engine ever
//! inspects; everything else is handed back to the caller untouched.

use rollcall_common::{DefinitionError, Kind};
use thiserror::Error;

/// Kubernetes-specific errors
#[derive(Debug, Error)]
pub enum K8sError {
    /// Kubernetes resource not found
    #[error("Resource not found: {kind}/{name} in namespace {namespace}")]
    ResourceNotFound {
        kind: Kind,
        name: String,
        namespace: String,
    },

    /// Resource already present on create
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Error from kube-rs client
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// Invalid kubeconfig
    #[error("Invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    /// Label selector that the API server would reject
    #[error("Invalid label selector: {0}")]
    InvalidSelector(String),

    /// Status hint with an unusable value
    #[error("Invalid status hint {key}={value}: {reason}")]
    InvalidMeta {
        key: String,
        value: String,
        reason: String,
    },

    /// Resource definition violates its invariants
    #[error("Invalid definition: {0}")]
    InvalidDefinition(#[from] DefinitionError),

    /// Internal system error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl K8sError {
    /// True when the object is absent from the cluster
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ResourceNotFound { .. } => true,
            Self::KubeError(kube::Error::Api(response)) => response.code == 404,
            _ => false,
        }
    }

    /// True when a create collided with an existing object
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::AlreadyExists(_) => true,
            Self::KubeError(kube::Error::Api(response)) => response.code == 409,
            _ => false,
        }
    }
}

/// Result type alias for Kubernetes operations
pub type K8sResult<T> = std::result::Result<T, K8sError>;
