//! Multi-Cluster Services API objects (`multicluster.x-k8s.io/v1alpha1`)
//!
//! Only the fields this crate reads are modeled.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::ServicePort;

/// ServiceExport declares that a local Service should be shared with the
/// cluster set. It carries no spec fields; existence is the declaration.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "multicluster.x-k8s.io",
    version = "v1alpha1",
    kind = "ServiceExport",
    plural = "serviceexports",
    shortname = "svcex",
    namespaced
)]
pub struct ServiceExportSpec {}

/// ServiceImport describes a service imported from the cluster set
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "multicluster.x-k8s.io",
    version = "v1alpha1",
    kind = "ServiceImport",
    plural = "serviceimports",
    shortname = "svcim",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceImportSpec {
    /// ClusterSetIP or Headless
    #[serde(default, rename = "type")]
    pub type_: String,

    /// Virtual IPs for the imported service
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<String>,

    /// Ports exposed by the imported service
    #[serde(default)]
    pub ports: Vec<ServicePort>,
}
