//! Ownership conventions for multicluster objects
//!
//! Shadow objects and the ResourceImports they come from live in different
//! clusters, so there is no owner reference to follow. Ownership and identity
//! are recovered purely from names, annotations, and labels. The forward
//! mappings here are the ones import paths use to name what they create; the
//! classifiers are their inverses. Everything in this module is pure.

use std::fmt;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::crd::{ExportKind, ImportKind, ResourceExport, ResourceImport};

/// Prefix for objects derived from imports whose target name may collide
/// with user objects (derived Services, ClusterNetworkPolicies)
pub const MC_RESOURCE_PREFIX: &str = "mcsync-";

/// Annotation marking Services and ServiceImports materialized from a
/// ResourceImport
pub const IMPORTED_SERVICE_ANNOTATION: &str = "multicluster.mcsync.io/imported-service";

/// Annotation marking ClusterNetworkPolicies materialized from a
/// ResourceImport
pub const IMPORTED_POLICY_ANNOTATION: &str = "multicluster.mcsync.io/imported-policy";

/// Label on ResourceExports naming the cluster that published them
pub const SOURCE_CLUSTER_ID_LABEL: &str = "multicluster.mcsync.io/source-cluster-id";

/// Namespace/name of a Kubernetes object
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// Namespace, `None` for cluster-scoped objects
    pub namespace: Option<String>,
    /// Object name
    pub name: String,
}

impl ObjectKey {
    /// Key for a namespaced object
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Key of the object described by `meta`, `None` if it has no name
    pub fn from_meta(meta: &ObjectMeta) -> Option<Self> {
        Some(Self {
            namespace: meta.namespace.clone(),
            name: meta.name.clone()?,
        })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Identity of a ResourceExport's target
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExportKey {
    /// Exported kind
    pub kind: ExportKind,
    /// Namespace of the exported object
    pub namespace: String,
    /// Name of the exported object
    pub name: String,
}

// =============================================================================
// Forward mappings (target identity -> local object name)
// =============================================================================

/// Name of the Service derived from a ServiceImport-kind ResourceImport
pub fn derived_service_name(target_name: &str) -> String {
    format!("{MC_RESOURCE_PREFIX}{target_name}")
}

/// Name of the ClusterNetworkPolicy derived from a policy import
pub fn derived_policy_name(import_name: &str) -> String {
    format!("{MC_RESOURCE_PREFIX}{import_name}")
}

/// Inverse of the derived-name mappings
///
/// `None` for names outside their image: no import derives an unprefixed
/// (or bare-prefix) name.
pub fn strip_mc_prefix(name: &str) -> Option<&str> {
    name.strip_prefix(MC_RESOURCE_PREFIX)
        .filter(|target| !target.is_empty())
}

// =============================================================================
// Desired identities (ResourceImport -> identity key)
// =============================================================================

/// `(targetNamespace, targetName)` of a ServiceImport-kind ResourceImport
pub fn imported_service_target(import: &ResourceImport) -> Option<ObjectKey> {
    (import.import_kind() == Some(ImportKind::ServiceImport))
        .then(|| ObjectKey::namespaced(&import.spec.namespace, &import.spec.name))
}

/// Logical name of a ClusterNetworkPolicy-kind ResourceImport
pub fn imported_policy_target(import: &ResourceImport) -> Option<String> {
    (import.import_kind() == Some(ImportKind::ClusterNetworkPolicy))
        .then(|| import.spec.name.clone())
}

/// Name of the ClusterInfoImport a ClusterInfo-kind ResourceImport produces
///
/// ClusterInfoImports reuse the ResourceImport's own name, which the leader
/// synthesizes from the exporting cluster's ID.
pub fn imported_cluster_info_target(import: &ResourceImport) -> Option<String> {
    if import.import_kind() != Some(ImportKind::ClusterInfo) {
        return None;
    }
    import.metadata.name.clone()
}

// =============================================================================
// Classifiers (local object -> ownership)
// =============================================================================

/// How a local object relates to the import paths
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ownership<K> {
    /// Created by someone else; never a deletion candidate
    Unowned,
    /// Owned, and justified while `K` is in the desired set
    Owned(K),
    /// Owned, but named outside every forward mapping, so no import can
    /// justify it
    Orphaned,
}

impl<K> Ownership<K> {
    /// True when the object must go given the `desired` predicate
    pub fn is_stale_given(&self, desired: impl FnOnce(&K) -> bool) -> bool {
        match self {
            Self::Unowned => false,
            Self::Owned(id) => !desired(id),
            Self::Orphaned => true,
        }
    }
}

fn has_annotation(meta: &ObjectMeta, key: &str) -> bool {
    meta.annotations
        .as_ref()
        .is_some_and(|annotations| annotations.contains_key(key))
}

/// Ownership of a Service, keyed by the import target it was derived from
pub fn classify_imported_service(meta: &ObjectMeta) -> Ownership<ObjectKey> {
    if !has_annotation(meta, IMPORTED_SERVICE_ANNOTATION) {
        return Ownership::Unowned;
    }
    let (Some(namespace), Some(name)) = (meta.namespace.as_deref(), meta.name.as_deref()) else {
        return Ownership::Unowned;
    };
    match strip_mc_prefix(name) {
        Some(target) => Ownership::Owned(ObjectKey::namespaced(namespace, target)),
        None => Ownership::Orphaned,
    }
}

/// Ownership of a ServiceImport
///
/// The MCS ServiceImport type is only ever written by the import path, so
/// every object is owned and keyed by its own namespace/name, which is the
/// import target verbatim.
pub fn classify_service_import(meta: &ObjectMeta) -> Ownership<ObjectKey> {
    match ObjectKey::from_meta(meta) {
        Some(key) if key.namespace.is_some() => Ownership::Owned(key),
        _ => Ownership::Unowned,
    }
}

/// Ownership of a ClusterNetworkPolicy, keyed by logical import name
pub fn classify_imported_policy(meta: &ObjectMeta) -> Ownership<String> {
    if !has_annotation(meta, IMPORTED_POLICY_ANNOTATION) {
        return Ownership::Unowned;
    }
    match meta.name.as_deref().map(strip_mc_prefix) {
        Some(Some(import_name)) => Ownership::Owned(import_name.to_string()),
        Some(None) => Ownership::Orphaned,
        None => Ownership::Unowned,
    }
}

/// Ownership of a ClusterInfoImport; only the import namespace is owned
pub fn classify_cluster_info_import(
    meta: &ObjectMeta,
    import_namespace: &str,
) -> Ownership<String> {
    match meta.name.clone() {
        Some(name) if meta.namespace.as_deref() == Some(import_namespace) => {
            Ownership::Owned(name)
        }
        _ => Ownership::Unowned,
    }
}

/// Identity of a ResourceExport published by `local_cluster_id`
///
/// Exports of other clusters, and exports whose kind this member does not
/// understand, are never owned.
pub fn classify_resource_export(
    export: &ResourceExport,
    local_cluster_id: &str,
) -> Option<ExportKey> {
    if export.source_cluster_id() != Some(local_cluster_id) {
        return None;
    }
    Some(ExportKey {
        kind: export.export_kind()?,
        namespace: export.spec.namespace.clone(),
        name: export.spec.name.clone(),
    })
}
