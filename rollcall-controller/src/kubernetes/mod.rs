//! Kubernetes integration
//!
//! The transport seam (`ClusterApi` / `ObjectApi`), its kube-rs and
//! in-memory implementations, label queries, and error types.

pub mod api;
pub mod client;
pub mod error;
pub mod memory;
pub mod selector;

pub use api::{ClusterApi, GroupVersion, ObjectApi};
pub use client::K8sClient;
pub use error::{K8sError, K8sResult};
pub use memory::MemoryCluster;
pub use selector::LabelQuery;
