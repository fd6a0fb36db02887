//! Sequential driver behind the `rollcall` subcommands
//!
//! Walks a list of definitions in file order. Dependency ordering between
//! resources is left to whoever wrote the file.

use crate::config::PollingConfig;
use crate::kubernetes::{ClusterApi, K8sError, K8sResult};
use crate::resources::registry::from_definition;
use crate::resources::{Resource, StatusMeta, SUCCESS_FACTOR};
use rollcall_common::{ResourceDefinition, Verdict};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Definition metadata key overriding the wait timeout, in seconds
pub const TIMEOUT: &str = "timeout";

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("{key} not ready after {}s: {last}", .waited.as_secs())]
    Timeout {
        key: String,
        waited: Duration,
        last: String,
    },

    #[error("{key} failed: {detail}")]
    Failed { key: String, detail: String },

    #[error(transparent)]
    Cluster(#[from] K8sError),
}

/// Create every definition, in order
pub async fn create_all(
    definitions: &[ResourceDefinition],
    cluster: Arc<dyn ClusterApi>,
) -> K8sResult<Vec<String>> {
    let mut created = Vec::with_capacity(definitions.len());
    for definition in definitions {
        let mut resource = from_definition(definition, cluster.clone())?;
        resource.create().await?;
        created.push(resource.key());
    }
    Ok(created)
}

/// Current verdict of every definition, in order
pub async fn status_all(
    definitions: &[ResourceDefinition],
    cluster: Arc<dyn ClusterApi>,
) -> K8sResult<Vec<(String, Verdict)>> {
    let mut verdicts = Vec::with_capacity(definitions.len());
    for definition in definitions {
        let resource = from_definition(definition, cluster.clone())?;
        let verdict = resource.status(&status_meta(resource.as_ref())).await?;
        verdicts.push((resource.key(), verdict));
    }
    Ok(verdicts)
}

/// Delete every definition in reverse order
///
/// Objects that are already gone are skipped; the keys actually deleted are
/// returned.
pub async fn delete_all(
    definitions: &[ResourceDefinition],
    cluster: Arc<dyn ClusterApi>,
) -> K8sResult<Vec<String>> {
    let mut deleted = Vec::new();
    for definition in definitions.iter().rev() {
        let resource = from_definition(definition, cluster.clone())?;
        match resource.delete().await {
            Ok(()) => deleted.push(resource.key()),
            Err(e) if e.is_not_found() => {
                tracing::warn!("{} already absent", resource.key());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(deleted)
}

/// Wait for every definition to become ready, one after the other
pub async fn wait_all(
    definitions: &[ResourceDefinition],
    cluster: Arc<dyn ClusterApi>,
    polling: &PollingConfig,
) -> Result<(), WaitError> {
    for definition in definitions {
        let resource = from_definition(definition, cluster.clone())?;
        wait_for(resource.as_ref(), polling).await?;
    }
    Ok(())
}

/// Poll one resource until it is ready, has failed, or its timeout elapses
///
/// Not-found counts as not ready yet; any other cluster error ends the wait.
pub async fn wait_for(resource: &dyn Resource, polling: &PollingConfig) -> Result<(), WaitError> {
    let key = resource.key();
    let timeout = timeout_for(resource, polling.timeout());
    let meta = status_meta(resource);
    let started = Instant::now();
    let deadline = started + timeout;

    tracing::info!("Waiting up to {}s for {}", timeout.as_secs(), key);
    loop {
        let last = match resource.status(&meta).await {
            Ok(Verdict::Ready) => {
                tracing::info!("{} is ready", key);
                return Ok(());
            }
            Ok(Verdict::Failed(detail)) => return Err(WaitError::Failed { key, detail }),
            Ok(verdict) => verdict.to_string(),
            Err(e) if e.is_not_found() => e.to_string(),
            Err(e) => return Err(e.into()),
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(WaitError::Timeout {
                key,
                waited: now - started,
                last,
            });
        }
        tracing::debug!("{}: {}", key, last);
        tokio::time::sleep(polling.interval().min(deadline - now)).await;
    }
}

/// Timeout for a resource: its `timeout` hint when present, `default` otherwise
pub fn timeout_for(resource: &dyn Resource, default: Duration) -> Duration {
    let Some(value) = resource.meta(TIMEOUT) else {
        return default;
    };

    let secs = match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };

    match secs {
        Some(secs) => Duration::from_secs(secs),
        None => {
            tracing::warn!("Ignoring unusable timeout {} on {}", value, resource.key());
            default
        }
    }
}

/// Status hints carried by a definition's metadata
fn status_meta(resource: &dyn Resource) -> StatusMeta {
    let mut meta = StatusMeta::new();
    if let Some(value) = resource.meta(SUCCESS_FACTOR) {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        meta.insert(SUCCESS_FACTOR.to_string(), value);
    }
    meta
}
