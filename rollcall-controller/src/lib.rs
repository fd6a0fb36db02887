//! Rollcall controller library
//!
//! Creates cluster resources idempotently and answers whether a resource,
//! together with everything it selects, is ready.

pub mod config;
pub mod driver;
pub mod kubernetes;
pub mod logging;
pub mod resources;

pub use kubernetes::{ClusterApi, K8sClient, K8sError, K8sResult, MemoryCluster};
pub use resources::{Resource, StatusMeta};
pub use rollcall_common::{Kind, ResourceDefinition, Verdict};
