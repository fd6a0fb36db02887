//! Legacy stateful workload (PetSet, apps/v1alpha1)
//!
//! PetSet predates StatefulSet and is schema-incompatible with it. Clusters
//! expose one generation or the other, never both. k8s-openapi stopped
//! shipping the type long ago, so it is declared here.

use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "apps",
    version = "v1alpha1",
    kind = "PetSet",
    plural = "petsets",
    namespaced,
    status = "PetSetStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct PetSetSpec {
    pub replicas: Option<i32>,
    pub selector: Option<LabelSelector>,
    pub service_name: Option<String>,
    pub template: Option<PodTemplateSpec>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PetSetStatus {
    pub observed_generation: Option<i64>,
    pub replicas: Option<i32>,
}
