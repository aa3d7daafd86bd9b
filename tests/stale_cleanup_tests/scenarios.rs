//! One story per kind of stale object
//!
//! Each test starts from a member whose leader lost some imports (or whose
//! user removed a ServiceExport) while the event-driven controllers were not
//! looking, and checks that a single cleanup brings it back in line.

use mcsync::controller::StaleKind;
use mcsync::local::LocalKind;
use mcsync::naming::ObjectKey;

use super::fixtures::*;
use super::helpers::{FakeLeader, FakeMember, Harness, LOCAL_CLUSTER_ID, MEMBER_NAMESPACE};

/// Story: `nginx` was unexported while the member was disconnected, but
/// `non-nginx` is still imported. The derived Service and ServiceImport of
/// `nginx` go; the pair for `non-nginx` stays.
#[tokio::test]
async fn story_unimported_service_pair_is_removed() {
    let member = FakeMember::default()
        .with(
            LocalKind::Service,
            vec![
                imported_service("default", "nginx"),
                imported_service("default", "non-nginx"),
            ],
        )
        .with(
            LocalKind::ServiceImport,
            vec![
                imported_service_import("default", "nginx"),
                imported_service_import("default", "non-nginx"),
            ],
        );
    let leader =
        FakeLeader::default().with_imports(vec![service_resource_import("default", "non-nginx")]);
    let h = Harness::connected(member, leader);

    let report = h.controller.cleanup().await.expect("cleanup should succeed");

    assert_eq!(report.deleted(StaleKind::ServicePair), 2);
    assert_eq!(h.member.names(LocalKind::Service), vec!["mcsync-non-nginx"]);
    assert_eq!(h.member.names(LocalKind::ServiceImport), vec!["non-nginx"]);
}

/// Story: a policy import was deleted on the leader. Its materialized policy
/// goes, the still-imported one stays, and the user's own policy is never
/// touched. A marked policy under the bare logical name was never written by
/// the import path, so the live import does not keep it.
#[tokio::test]
async fn story_unimported_policy_is_removed() {
    let member = FakeMember::default().with(
        LocalKind::ClusterNetworkPolicy,
        vec![
            imported_policy("acnp-for-isolation"),
            imported_policy("some-deleted-resimp"),
            marked_policy_named("acnp-for-isolation"),
            user_policy("non-mcs-acnp"),
        ],
    );
    let leader = FakeLeader::default().with_imports(vec![policy_resource_import(
        "default-acnp-for-isolation",
        "acnp-for-isolation",
    )]);
    let h = Harness::connected(member, leader);

    let report = h.controller.cleanup().await.expect("cleanup should succeed");

    assert_eq!(report.deleted(StaleKind::ClusterNetworkPolicy), 2);
    assert_eq!(
        h.member.names(LocalKind::ClusterNetworkPolicy),
        vec!["mcsync-acnp-for-isolation", "non-mcs-acnp"]
    );
}

/// Story: cluster-b left the cluster set. Its ClusterInfoImport goes; the
/// one for cluster-a, still backed by a ResourceImport, stays.
#[tokio::test]
async fn story_departed_cluster_info_is_removed() {
    let member = FakeMember::default().with(
        LocalKind::ClusterInfoImport,
        vec![
            cluster_info_import(MEMBER_NAMESPACE, "cluster-a-default-clusterinfo"),
            cluster_info_import(MEMBER_NAMESPACE, "cluster-b-default-clusterinfo"),
        ],
    );
    let leader = FakeLeader::default().with_imports(vec![cluster_info_resource_import(
        "cluster-a-default-clusterinfo",
        "cluster-a",
    )]);
    let h = Harness::connected(member, leader);

    let report = h.controller.cleanup().await.expect("cleanup should succeed");

    assert_eq!(report.deleted(StaleKind::ClusterInfoImport), 1);
    assert_eq!(
        h.member.names(LocalKind::ClusterInfoImport),
        vec!["cluster-a-default-clusterinfo"]
    );
}

/// Story: the user removed the ServiceExport for `nginx` while the member was
/// disconnected. Its Service and Endpoints exports go, along with this
/// cluster's ClusterInfo export (which is re-published right after). The
/// still-declared `keep-nginx` export and cluster-b's exports stay.
#[tokio::test]
async fn story_undeclared_exports_are_removed_from_the_leader() {
    let member = FakeMember::default().with(
        LocalKind::ServiceExport,
        vec![service_export("default", "keep-nginx")],
    );
    let leader = FakeLeader::default().with_exports(vec![
        labeled_export("cluster-a-default-nginx-service", LOCAL_CLUSTER_ID, "Service", "nginx"),
        labeled_export("cluster-a-default-nginx-endpoint", LOCAL_CLUSTER_ID, "Endpoints", "nginx"),
        unlabeled_cluster_info_export("cluster-a-clusterinfo", LOCAL_CLUSTER_ID),
        labeled_export(
            "cluster-a-default-keep-nginx-service",
            LOCAL_CLUSTER_ID,
            "Service",
            "keep-nginx",
        ),
        labeled_export("cluster-b-default-nginx-service", "cluster-b", "Service", "nginx"),
    ]);
    let h = Harness::connected(member, leader);

    let report = h.controller.cleanup().await.expect("cleanup should succeed");

    assert_eq!(report.deleted(StaleKind::ResourceExport), 3);
    assert_eq!(
        h.leader.export_names(),
        vec![
            "cluster-a-default-keep-nginx-service",
            "cluster-b-default-nginx-service",
        ]
    );
    assert_eq!(
        h.member.keys(LocalKind::ServiceExport),
        vec![ObjectKey::namespaced("default", "keep-nginx")]
    );
}
