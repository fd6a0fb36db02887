//! Idempotent creation
//!
//! Creation is declarative: an object that already exists counts as
//! created and is left untouched. Only a not-found answer to the existence
//! check leads to a create call; any other error is returned as-is.

use crate::kubernetes::{K8sResult, ObjectApi};
use kube::ResourceExt;
use rollcall_common::Kind;

/// Create `desired` unless an object with its name already exists
///
/// On creation `desired` is replaced by the object the cluster returned, so
/// server-assigned fields (uid, addresses, ...) become visible to the caller.
/// The check and the create are two separate calls; concurrent callers for
/// the same object can race.
pub async fn create_if_absent<K>(api: &dyn ObjectApi<K>, kind: Kind, desired: &mut K) -> K8sResult<()>
where
    K: kube::Resource + Send + Sync,
{
    let name = desired.name_any();
    let key = kind.key(&name);

    match api.get(&name).await {
        Ok(_) => {
            tracing::debug!("{} already exists, not creating", key);
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            tracing::info!("Creating {}", key);
            *desired = api.create(desired).await?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}
