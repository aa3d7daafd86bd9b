//! ResourceImport Custom Resource Definition
//!
//! A ResourceImport is the leader's aggregated, authoritative record of what
//! every member of a cluster set should materialize locally. Members only ever
//! read these objects.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::cluster_network_policy::ClusterNetworkPolicySpec;
use super::types::{ClusterInfo, ImportKind, ServicePort};

/// Specification for a ResourceImport
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "multicluster.mcsync.io",
    version = "v1alpha1",
    kind = "ResourceImport",
    plural = "resourceimports",
    shortname = "resimp",
    namespaced,
    printcolumn = r#"{"name":"Kind","type":"string","jsonPath":".spec.kind"}"#,
    printcolumn = r#"{"name":"Namespace","type":"string","jsonPath":".spec.namespace"}"#,
    printcolumn = r#"{"name":"Name","type":"string","jsonPath":".spec.name"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ResourceImportSpec {
    /// Member clusters the import applies to (empty means every member)
    #[serde(default, rename = "clusterIDs", skip_serializing_if = "Vec::is_empty")]
    pub cluster_ids: Vec<String>,

    /// Name of the target object
    #[serde(default)]
    pub name: String,

    /// Namespace of the target object (empty for cluster-scoped targets)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// Kind of object to materialize
    pub kind: String,

    /// Payload for ServiceImport imports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_import: Option<ServiceImportPayload>,

    /// Payload for ClusterNetworkPolicy imports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_network_policy: Option<ClusterNetworkPolicySpec>,

    /// Payload for ClusterInfo imports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_info: Option<ClusterInfo>,
}

/// Aggregated service information across exporting clusters
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceImportPayload {
    /// Virtual IPs of the imported service
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<String>,

    /// Union of exported ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ServicePort>,
}

impl ResourceImportSpec {
    /// Parsed kind, `None` when the leader sent a kind this member does not know
    pub fn import_kind(&self) -> Option<ImportKind> {
        ImportKind::parse(&self.kind)
    }
}

impl ResourceImport {
    /// Parsed kind of this import
    pub fn import_kind(&self) -> Option<ImportKind> {
        self.spec.import_kind()
    }
}
