//! Guarantees every cleanup keeps

use mcsync::controller::{SkipReason, StaleKind};
use mcsync::local::LocalKind;
use mcsync::Error;

use super::fixtures::*;
use super::helpers::{FakeLeader, FakeMember, Harness, CLUSTER_SET, LOCAL_CLUSTER_ID};

/// A member with stale objects of every kind next to live and user-owned ones
fn drifted_member() -> FakeMember {
    FakeMember::default()
        .with(
            LocalKind::Service,
            vec![
                imported_service("default", "gone"),
                imported_service("default", "live"),
                user_object("default", "gone"),
                user_object("default", "mcsync-lookalike"),
            ],
        )
        .with(
            LocalKind::ServiceImport,
            vec![
                imported_service_import("default", "gone"),
                imported_service_import("default", "live"),
            ],
        )
        .with(
            LocalKind::ClusterNetworkPolicy,
            vec![imported_policy("gone"), user_policy("mcsync-lookalike")],
        )
        .with(
            LocalKind::ClusterInfoImport,
            vec![
                cluster_info_import("default", "cluster-b-default-clusterinfo"),
                cluster_info_import("elsewhere", "cluster-b-default-clusterinfo"),
            ],
        )
}

fn leader() -> FakeLeader {
    FakeLeader::default()
        .with_imports(vec![service_resource_import("default", "live")])
        .with_exports(vec![
            labeled_export("cluster-a-default-gone-service", LOCAL_CLUSTER_ID, "Service", "gone"),
            labeled_export("cluster-b-default-gone-service", "cluster-b", "Service", "gone"),
        ])
}

/// Story: the second of two back-to-back cleanups finds nothing to do.
#[tokio::test]
async fn story_cleanup_is_idempotent() {
    let h = Harness::connected(drifted_member(), leader());

    let first = h.controller.cleanup().await.expect("first cleanup");
    assert!(first.total_deleted() > 0);

    let services = h.member.keys(LocalKind::Service);
    let exports = h.leader.export_names();

    let second = h.controller.cleanup().await.expect("second cleanup");
    assert_eq!(second.total_deleted(), 0);
    assert_eq!(h.member.keys(LocalKind::Service), services);
    assert_eq!(h.leader.export_names(), exports);
}

/// Story: objects without the ownership marker survive even when their name
/// looks derived, and so do objects outside the import namespace and other
/// clusters' exports.
#[tokio::test]
async fn story_unowned_objects_are_never_deleted() {
    let h = Harness::connected(drifted_member(), leader());

    let report = h.controller.cleanup().await.expect("cleanup should succeed");

    assert_eq!(report.deleted(StaleKind::ServicePair), 2);
    assert_eq!(
        h.member.names(LocalKind::Service),
        vec!["gone", "mcsync-live", "mcsync-lookalike"]
    );
    assert_eq!(h.member.names(LocalKind::ServiceImport), vec!["live"]);
    assert_eq!(
        h.member.names(LocalKind::ClusterNetworkPolicy),
        vec!["mcsync-lookalike"]
    );
    let remaining_info = h.member.keys(LocalKind::ClusterInfoImport);
    assert_eq!(remaining_info.len(), 1);
    assert_eq!(remaining_info[0].namespace.as_deref(), Some("elsewhere"));
    assert_eq!(
        h.leader.export_names(),
        vec!["cluster-b-default-gone-service"]
    );
}

/// Story: once the leader connection drops, nothing is deleted, however
/// stale the member looks.
#[tokio::test]
async fn story_disconnected_member_is_left_alone() {
    let h = Harness::connected(drifted_member(), leader());
    h.manager.unregister(CLUSTER_SET);

    let before = h.member.keys(LocalKind::Service);
    let report = h.controller.cleanup().await.expect("skip is not an error");

    assert_eq!(report.skipped, Some(SkipReason::NoLeaderConnection));
    assert!(report.deleted.is_empty());
    assert_eq!(h.member.keys(LocalKind::Service), before);
    assert_eq!(h.leader.export_names().len(), 2);
}

/// Story: the member refuses to list policies. That pass deletes nothing and
/// is reported, while every other kind is still cleaned up.
#[tokio::test]
async fn story_one_failing_kind_does_not_block_the_others() {
    let member = drifted_member();
    member.fail_list(LocalKind::ClusterNetworkPolicy);
    let h = Harness::connected(member, leader());

    let err = h
        .controller
        .cleanup()
        .await
        .expect_err("policy pass failure must surface");

    match err {
        Error::Cleanup(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].kind, StaleKind::ClusterNetworkPolicy);
        }
        other => panic!("expected aggregated cleanup error, got {other}"),
    }

    assert_eq!(h.member.names(LocalKind::ClusterNetworkPolicy).len(), 2);
    assert_eq!(h.member.names(LocalKind::ServiceImport), vec!["live"]);
    assert_eq!(h.member.keys(LocalKind::ClusterInfoImport).len(), 1);
    assert_eq!(
        h.leader.export_names(),
        vec!["cluster-b-default-gone-service"]
    );
}
