//! Readiness verdicts

use serde::{Deserialize, Serialize};

/// Outcome of a readiness check
///
/// `NotReady` is transient and worth polling again; `Failed` is terminal
/// (e.g. a job that exhausted its retries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "kebab-case")]
pub enum Verdict {
    Ready,
    NotReady(String),
    Failed(String),
}

impl Verdict {
    pub fn not_ready(detail: impl Into<String>) -> Self {
        Self::NotReady(detail.into())
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self::Failed(detail.into())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Status word without the detail: "ready", "not ready" or "error"
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::NotReady(_) => "not ready",
            Self::Failed(_) => "error",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Ready => None,
            Self::NotReady(detail) | Self::Failed(detail) => Some(detail),
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.detail() {
            Some(detail) if !detail.is_empty() => write!(f, "{}: {}", self.as_str(), detail),
            _ => f.write_str(self.as_str()),
        }
    }
}
