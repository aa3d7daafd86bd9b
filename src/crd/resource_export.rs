//! ResourceExport Custom Resource Definition
//!
//! Members publish ResourceExports into the leader's common area to share
//! objects they own. The exporting cluster is recorded in the
//! `multicluster.mcsync.io/source-cluster-id` label.

use kube::CustomResource;
use kube::ResourceExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{ClusterInfo, ExportKind, ServicePort};
use crate::naming::SOURCE_CLUSTER_ID_LABEL;

/// Specification for a ResourceExport
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "multicluster.mcsync.io",
    version = "v1alpha1",
    kind = "ResourceExport",
    plural = "resourceexports",
    shortname = "resexp",
    namespaced,
    printcolumn = r#"{"name":"Cluster","type":"string","jsonPath":".metadata.labels.multicluster\\.mcsync\\.io/source-cluster-id"}"#,
    printcolumn = r#"{"name":"Kind","type":"string","jsonPath":".spec.kind"}"#,
    printcolumn = r#"{"name":"Name","type":"string","jsonPath":".spec.name"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ResourceExportSpec {
    /// ID of the exporting cluster
    #[serde(default, rename = "clusterID", skip_serializing_if = "String::is_empty")]
    pub cluster_id: String,

    /// Name of the exported object
    #[serde(default)]
    pub name: String,

    /// Namespace of the exported object
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// Kind of the exported object
    pub kind: String,

    /// Exported service ports (Service kind)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ServicePort>,

    /// Endpoint addresses (Endpoints kind)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,

    /// Exported cluster information (ClusterInfo kind)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_info: Option<ClusterInfo>,
}

impl ResourceExport {
    /// Parsed kind of this export
    pub fn export_kind(&self) -> Option<ExportKind> {
        ExportKind::parse(&self.spec.kind)
    }

    /// Cluster that published this export
    ///
    /// The source-cluster label is authoritative; exports written without it
    /// fall back to `spec.clusterID`.
    pub fn source_cluster_id(&self) -> Option<&str> {
        self.labels()
            .get(SOURCE_CLUSTER_ID_LABEL)
            .map(String::as_str)
            .or_else(|| Some(self.spec.cluster_id.as_str()).filter(|id| !id.is_empty()))
    }
}
