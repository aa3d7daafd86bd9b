//! ClusterInfoImport Custom Resource Definition
//!
//! Local record of a peer cluster's ClusterInfo, named after the
//! ResourceImport it was materialized from.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::ClusterInfo;

/// Specification for a ClusterInfoImport
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "multicluster.mcsync.io",
    version = "v1alpha1",
    kind = "ClusterInfoImport",
    plural = "clusterinfoimports",
    shortname = "ciimp",
    namespaced,
    printcolumn = r#"{"name":"Cluster","type":"string","jsonPath":".spec.clusterID"}"#,
    printcolumn = r#"{"name":"Service CIDR","type":"string","jsonPath":".spec.serviceCIDR"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfoImportSpec {
    /// Imported cluster information
    #[serde(flatten)]
    pub info: ClusterInfo,
}
