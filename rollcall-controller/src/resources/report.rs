//! Reporting decorator
//!
//! Every resource handed out by the factories is wrapped in a
//! [`SimpleReporter`], which emits tracing events for each lifecycle call.
//! Subscribers (log files, metrics bridges) observe creation and readiness
//! without the engine knowing about them.

use super::{Resource, StatusMeta};
use crate::kubernetes::K8sResult;
use async_trait::async_trait;
use rollcall_common::Verdict;

pub struct SimpleReporter {
    inner: Box<dyn Resource>,
}

impl SimpleReporter {
    /// Wrap a resource and erase its type
    pub fn wrap(inner: impl Resource + 'static) -> Box<dyn Resource> {
        Box::new(Self {
            inner: Box::new(inner),
        })
    }
}

#[async_trait]
impl Resource for SimpleReporter {
    fn key(&self) -> String {
        self.inner.key()
    }

    async fn create(&mut self) -> K8sResult<()> {
        let key = self.inner.key();
        let result = self.inner.create().await;
        match &result {
            Ok(()) => tracing::info!(resource = %key, "resource present"),
            Err(e) => tracing::warn!(resource = %key, error = %e, "create failed"),
        }
        result
    }

    async fn delete(&self) -> K8sResult<()> {
        let key = self.inner.key();
        let result = self.inner.delete().await;
        match &result {
            Ok(()) => tracing::info!(resource = %key, "resource deleted"),
            Err(e) => tracing::warn!(resource = %key, error = %e, "delete failed"),
        }
        result
    }

    async fn status(&self, meta: &StatusMeta) -> K8sResult<Verdict> {
        let key = self.inner.key();
        tracing::debug!("Checking status of {}", key);
        let result = self.inner.status(meta).await;
        match &result {
            Ok(verdict) => tracing::debug!(resource = %key, status = %verdict, "status checked"),
            Err(e) => tracing::debug!(resource = %key, error = %e, "status check failed"),
        }
        result
    }

    fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.inner.meta(key)
    }
}
