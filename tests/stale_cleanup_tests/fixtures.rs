//! Object builders for member and leader state

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use mcsync::crd::{
    ClusterInfo, ResourceExport, ResourceExportSpec, ResourceImport, ResourceImportSpec,
};
use mcsync::naming::{
    derived_service_name, IMPORTED_POLICY_ANNOTATION, IMPORTED_SERVICE_ANNOTATION,
    MC_RESOURCE_PREFIX, SOURCE_CLUSTER_ID_LABEL,
};

pub const LEADER_NAMESPACE: &str = "mcsync-leader";

fn meta(namespace: Option<&str>, name: &str) -> ObjectMeta {
    ObjectMeta {
        namespace: namespace.map(str::to_string),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

fn annotated(mut meta: ObjectMeta, key: &str) -> ObjectMeta {
    meta.annotations = Some(BTreeMap::from([(key.to_string(), "true".to_string())]));
    meta
}

// =============================================================================
// Member objects
// =============================================================================

/// Service derived from an imported service
pub fn imported_service(namespace: &str, target: &str) -> ObjectMeta {
    annotated(
        meta(Some(namespace), &derived_service_name(target)),
        IMPORTED_SERVICE_ANNOTATION,
    )
}

/// ServiceImport materialized for an imported service; the import path
/// writes it without any marker
pub fn imported_service_import(namespace: &str, target: &str) -> ObjectMeta {
    meta(Some(namespace), target)
}

/// Service created by a user
pub fn user_object(namespace: &str, name: &str) -> ObjectMeta {
    meta(Some(namespace), name)
}

/// ClusterNetworkPolicy materialized from a policy import
pub fn imported_policy(import_name: &str) -> ObjectMeta {
    annotated(
        meta(None, &format!("{MC_RESOURCE_PREFIX}{import_name}")),
        IMPORTED_POLICY_ANNOTATION,
    )
}

/// Marked ClusterNetworkPolicy whose name no import path produces
pub fn marked_policy_named(name: &str) -> ObjectMeta {
    annotated(meta(None, name), IMPORTED_POLICY_ANNOTATION)
}

/// ClusterNetworkPolicy created by a user
pub fn user_policy(name: &str) -> ObjectMeta {
    meta(None, name)
}

pub fn cluster_info_import(namespace: &str, name: &str) -> ObjectMeta {
    meta(Some(namespace), name)
}

pub fn service_export(namespace: &str, name: &str) -> ObjectMeta {
    meta(Some(namespace), name)
}

// =============================================================================
// Leader objects
// =============================================================================

fn resource_import(name: &str, spec: ResourceImportSpec) -> ResourceImport {
    ResourceImport {
        metadata: meta(Some(LEADER_NAMESPACE), name),
        spec,
    }
}

pub fn service_resource_import(namespace: &str, target: &str) -> ResourceImport {
    resource_import(
        &format!("{namespace}-{target}-service"),
        ResourceImportSpec {
            name: target.to_string(),
            namespace: namespace.to_string(),
            kind: "ServiceImport".to_string(),
            ..Default::default()
        },
    )
}

pub fn policy_resource_import(resource_name: &str, import_name: &str) -> ResourceImport {
    resource_import(
        resource_name,
        ResourceImportSpec {
            name: import_name.to_string(),
            kind: "ClusterNetworkPolicy".to_string(),
            ..Default::default()
        },
    )
}

pub fn cluster_info_resource_import(name: &str, cluster_id: &str) -> ResourceImport {
    resource_import(
        name,
        ResourceImportSpec {
            name: cluster_id.to_string(),
            kind: "ClusterInfo".to_string(),
            cluster_info: Some(ClusterInfo {
                cluster_id: cluster_id.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        },
    )
}

/// ResourceExport labeled with its source cluster
pub fn labeled_export(name: &str, source: &str, kind: &str, target: &str) -> ResourceExport {
    let mut metadata = meta(Some(LEADER_NAMESPACE), name);
    metadata.labels = Some(BTreeMap::from([(
        SOURCE_CLUSTER_ID_LABEL.to_string(),
        source.to_string(),
    )]));
    ResourceExport {
        metadata,
        spec: ResourceExportSpec {
            name: target.to_string(),
            namespace: "default".to_string(),
            kind: kind.to_string(),
            ..Default::default()
        },
    }
}

/// ClusterInfo export carrying its source only in the spec
pub fn unlabeled_cluster_info_export(name: &str, cluster_id: &str) -> ResourceExport {
    ResourceExport {
        metadata: meta(Some(LEADER_NAMESPACE), name),
        spec: ResourceExportSpec {
            cluster_id: cluster_id.to_string(),
            name: "tobedeleted".to_string(),
            namespace: "default".to_string(),
            kind: "ClusterInfo".to_string(),
            ..Default::default()
        },
    }
}
