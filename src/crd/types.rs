//! Shared types for the multicluster CRDs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of object a ResourceImport instructs members to materialize
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// Derived Service plus ServiceImport record
    ServiceImport,
    /// Cluster-scoped network policy copy
    ClusterNetworkPolicy,
    /// ClusterInfoImport record for a peer cluster
    ClusterInfo,
}

impl ImportKind {
    /// Value carried in `spec.kind`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceImport => "ServiceImport",
            Self::ClusterNetworkPolicy => "ClusterNetworkPolicy",
            Self::ClusterInfo => "ClusterInfo",
        }
    }

    /// Parse a `spec.kind` value; unknown kinds yield `None`
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "ServiceImport" => Some(Self::ServiceImport),
            "ClusterNetworkPolicy" => Some(Self::ClusterNetworkPolicy),
            "ClusterInfo" => Some(Self::ClusterInfo),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of object a member publishes through a ResourceExport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExportKind {
    /// Exported Service
    Service,
    /// Endpoints backing an exported Service
    Endpoints,
    /// This cluster's ClusterInfo
    ClusterInfo,
}

impl ExportKind {
    /// Value carried in `spec.kind`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "Service",
            Self::Endpoints => "Endpoints",
            Self::ClusterInfo => "ClusterInfo",
        }
    }

    /// Parse a `spec.kind` value; unknown kinds yield `None`
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "Service" => Some(Self::Service),
            "Endpoints" => Some(Self::Endpoints),
            "ClusterInfo" => Some(Self::ClusterInfo),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connectivity information a cluster shares with the rest of its cluster set
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    /// ID of the cluster this information describes
    #[serde(default, rename = "clusterID")]
    pub cluster_id: String,

    /// Service CIDR of the cluster
    #[serde(default, rename = "serviceCIDR")]
    pub service_cidr: String,

    /// Gateway nodes reachable from peer clusters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gateway_infos: Vec<GatewayInfo>,
}

/// A gateway node address
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayInfo {
    /// Address peers tunnel to
    #[serde(rename = "gatewayIP")]
    pub gateway_ip: String,
}

/// Port exposed by an imported service
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    /// Port name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Protocol (TCP, UDP, SCTP)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Port number
    pub port: i32,
}
