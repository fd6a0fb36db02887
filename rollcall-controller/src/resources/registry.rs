//! Resource factories
//!
//! One template per kind, kept in a static table indexed by [`Kind`]. The
//! outer layer uses the table to build resources without knowing their
//! concrete type: from a definition, from a `"<kind>/<name>"` key, or by
//! looking a key up in a list of definitions.

use super::report::SimpleReporter;
use super::variant::{Existing, Managed};
use super::{ClusterObject, Resource};
use crate::kubernetes::{ClusterApi, K8sResult};
use k8s_openapi::api::apps::v1::{ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Pod, Service};
use rollcall_common::{DefinitionError, Kind, PetSet, ResourceDefinition};
use std::marker::PhantomData;
use std::sync::Arc;

/// Constructors and matching for one resource kind
pub trait ResourceTemplate: Send + Sync {
    fn kind(&self) -> Kind;

    /// True iff this kind's field is populated in `definition` and named `name`
    fn name_matches(&self, definition: &ResourceDefinition, name: &str) -> bool;

    /// Managed resource for `definition`
    fn new(
        &self,
        definition: &ResourceDefinition,
        cluster: Arc<dyn ClusterApi>,
    ) -> K8sResult<Box<dyn Resource>>;

    /// Existing resource referring to `name`
    fn new_existing(&self, name: &str, cluster: Arc<dyn ClusterApi>) -> Box<dyn Resource>;
}

struct KindTemplate<K>(PhantomData<fn() -> K>);

impl<K: ClusterObject> ResourceTemplate for KindTemplate<K> {
    fn kind(&self) -> Kind {
        K::KIND
    }

    fn name_matches(&self, definition: &ResourceDefinition, name: &str) -> bool {
        K::from_definition(definition)
            .is_some_and(|object| kube::Resource::meta(object).name.as_deref() == Some(name))
    }

    fn new(
        &self,
        definition: &ResourceDefinition,
        cluster: Arc<dyn ClusterApi>,
    ) -> K8sResult<Box<dyn Resource>> {
        let found = definition.kind()?;
        let object = K::from_definition(definition).ok_or(DefinitionError::WrongKind {
            expected: K::KIND,
            found,
        })?;
        definition.name()?;

        Ok(SimpleReporter::wrap(Managed::new(
            object.clone(),
            cluster,
            definition.meta.clone(),
        )))
    }

    fn new_existing(&self, name: &str, cluster: Arc<dyn ClusterApi>) -> Box<dyn Resource> {
        SimpleReporter::wrap(Existing::<K>::new(name, cluster))
    }
}

static TEMPLATES: [&dyn ResourceTemplate; 6] = [
    &KindTemplate::<Service>(PhantomData),
    &KindTemplate::<Pod>(PhantomData),
    &KindTemplate::<Job>(PhantomData),
    &KindTemplate::<ReplicaSet>(PhantomData),
    &KindTemplate::<StatefulSet>(PhantomData),
    &KindTemplate::<PetSet>(PhantomData),
];

/// Every template, in `Kind::ALL` order
pub fn templates() -> &'static [&'static dyn ResourceTemplate] {
    &TEMPLATES
}

/// Template for a kind
pub fn template(kind: Kind) -> &'static dyn ResourceTemplate {
    match kind {
        Kind::Service => TEMPLATES[0],
        Kind::Pod => TEMPLATES[1],
        Kind::Job => TEMPLATES[2],
        Kind::ReplicaSet => TEMPLATES[3],
        Kind::StatefulSet => TEMPLATES[4],
        Kind::PetSet => TEMPLATES[5],
    }
}

/// Managed resource for whichever kind `definition` populates
pub fn from_definition(
    definition: &ResourceDefinition,
    cluster: Arc<dyn ClusterApi>,
) -> K8sResult<Box<dyn Resource>> {
    template(definition.kind()?).new(definition, cluster)
}

/// Existing resource for a `"<kind>/<name>"` key
pub fn existing(key: &str, cluster: Arc<dyn ClusterApi>) -> K8sResult<Box<dyn Resource>> {
    let (kind, name) = Kind::parse_key(key)?;
    Ok(template(kind).new_existing(name, cluster))
}

/// Resource for `key`, built from the first matching definition
///
/// Falls back to the existing variant when no definition matches, so keys
/// can refer to objects provisioned elsewhere.
pub fn resolve(
    key: &str,
    definitions: &[ResourceDefinition],
    cluster: Arc<dyn ClusterApi>,
) -> K8sResult<Box<dyn Resource>> {
    let (kind, name) = Kind::parse_key(key)?;
    let template = template(kind);

    match definitions
        .iter()
        .find(|definition| template.name_matches(definition, name))
    {
        Some(definition) => template.new(definition, cluster),
        None => {
            tracing::debug!("No definition for {}, treating it as existing", key);
            Ok(template.new_existing(name, cluster))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::memory::MemoryCluster;
    use crate::kubernetes::K8sError;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn named(name: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn service_definition(name: &str) -> ResourceDefinition {
        ResourceDefinition {
            service: Some(Service {
                metadata: named(name),
                ..Default::default()
            }),
            meta: [("timeout".to_string(), serde_json::json!(60))].into(),
            ..Default::default()
        }
    }

    fn cluster() -> Arc<dyn ClusterApi> {
        Arc::new(MemoryCluster::new())
    }

    #[test]
    fn test_table_covers_every_kind_in_order() {
        let kinds: Vec<Kind> = templates().iter().map(|t| t.kind()).collect();
        assert_eq!(kinds, Kind::ALL.to_vec());
        for kind in Kind::ALL {
            assert_eq!(template(kind).kind(), kind);
        }
    }

    #[test]
    fn test_name_matches() {
        let definition = service_definition("frontend");

        assert!(template(Kind::Service).name_matches(&definition, "frontend"));
        assert!(!template(Kind::Service).name_matches(&definition, "backend"));
        for kind in Kind::ALL.into_iter().filter(|k| *k != Kind::Service) {
            assert!(!template(kind).name_matches(&definition, "frontend"));
        }
        assert!(!template(Kind::Service).name_matches(&ResourceDefinition::default(), "frontend"));
    }

    #[test]
    fn test_from_definition_builds_managed_resource() {
        let resource = from_definition(&service_definition("frontend"), cluster()).unwrap();
        assert_eq!(resource.key(), "service/frontend");
        assert_eq!(resource.meta("timeout"), Some(&serde_json::json!(60)));
    }

    #[test]
    fn test_template_rejects_other_kinds() {
        let err = template(Kind::Pod)
            .new(&service_definition("frontend"), cluster())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            K8sError::InvalidDefinition(DefinitionError::WrongKind {
                expected: Kind::Pod,
                found: Kind::Service,
            })
        ));
    }

    #[test]
    fn test_unnamed_definition_is_rejected() {
        let definition = ResourceDefinition {
            pod: Some(Pod::default()),
            ..Default::default()
        };
        assert!(matches!(
            from_definition(&definition, cluster()),
            Err(K8sError::InvalidDefinition(DefinitionError::MissingName(Kind::Pod)))
        ));
    }

    #[test]
    fn test_existing_from_key() {
        let resource = existing("statefulset/db", cluster()).unwrap();
        assert_eq!(resource.key(), "statefulset/db");
        assert!(resource.meta("timeout").is_none());

        assert!(existing("widget/db", cluster()).is_err());
        assert!(existing("statefulset", cluster()).is_err());
    }

    #[test]
    fn test_resolve_prefers_definitions() {
        let definitions = vec![service_definition("backend"), service_definition("frontend")];

        let found = resolve("service/frontend", &definitions, cluster()).unwrap();
        assert_eq!(found.key(), "service/frontend");
        assert!(found.meta("timeout").is_some());

        let fallback = resolve("service/elsewhere", &definitions, cluster()).unwrap();
        assert_eq!(fallback.key(), "service/elsewhere");
        assert!(fallback.meta("timeout").is_none());
    }
}
