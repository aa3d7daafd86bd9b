//! Custom Resource Definitions for multicluster federation
//!
//! This module contains the common-area primitives (ResourceImport,
//! ResourceExport), the shadow objects members materialize from them, and the
//! Multi-Cluster Services API objects members read.

mod cluster_info_import;
mod cluster_network_policy;
mod mcs;
mod resource_export;
mod resource_import;
mod types;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::CustomResourceExt;

pub use cluster_info_import::{ClusterInfoImport, ClusterInfoImportSpec};
pub use cluster_network_policy::{
    ClusterNetworkPolicy, ClusterNetworkPolicySpec, PolicyPeer, PolicyRule,
};
pub use mcs::{ServiceExport, ServiceExportSpec, ServiceImport, ServiceImportSpec};
pub use resource_export::{ResourceExport, ResourceExportSpec};
pub use resource_import::{ResourceImport, ResourceImportSpec, ServiceImportPayload};
pub use types::{ClusterInfo, ExportKind, GatewayInfo, ImportKind, ServicePort};

/// Render every owned CRD as a multi-document YAML stream
pub fn render_crds() -> Result<String, crate::Error> {
    owned_crds()
        .iter()
        .map(|crd| {
            serde_yaml::to_string(crd)
                .map(|yaml| format!("---\n{yaml}"))
                .map_err(|e| crate::Error::serialization(format!("CRD rendering failed: {e}")))
        })
        .collect()
}

/// Definitions of every CRD this crate owns
///
/// The Multi-Cluster Services API objects and the policy type belong to other
/// projects and are installed by them.
pub fn owned_crds() -> Vec<CustomResourceDefinition> {
    vec![
        ResourceImport::crd(),
        ResourceExport::crd(),
        ClusterInfoImport::crd(),
    ]
}
