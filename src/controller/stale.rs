//! Stale resource cleanup
//!
//! The import and export controllers are event driven: a delete that happens
//! while a controller is down, or while the leader is unreachable, is never
//! seen. This controller closes that gap by periodically recomputing, for each
//! kind, the set of identities the authoritative source still justifies and
//! deleting every owned object outside it.
//!
//! Each pass is a pure diff over fresh listings. Nothing is cached between
//! calls, and a pass whose listings fail deletes nothing.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tokio::sync::{Mutex, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::commonarea::{CommonArea, CommonAreaManager};
use crate::crd::{ExportKind, ResourceExport, ResourceImport};
use crate::error::PassFailure;
use crate::local::{ListScope, LocalClient, LocalKind};
use crate::naming::{
    classify_cluster_info_import, classify_imported_policy, classify_imported_service,
    classify_resource_export, classify_service_import, imported_cluster_info_target,
    imported_policy_target, imported_service_target, ObjectKey, Ownership,
};
use crate::Error;

/// Default interval between periodic cleanups
pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(300);

/// Default deadline for a single list or delete call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default interval for polling leader connectivity before the first pass
pub const DEFAULT_LEADER_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Kinds of stale objects, in the order they are cleaned up
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StaleKind {
    /// Derived Services and ServiceImports
    ServicePair,
    /// Imported ClusterNetworkPolicies
    ClusterNetworkPolicy,
    /// ClusterInfoImports
    ClusterInfoImport,
    /// This cluster's ResourceExports in the common area
    ResourceExport,
}

impl StaleKind {
    /// Every kind, in pass order
    pub const ALL: [StaleKind; 4] = [
        StaleKind::ServicePair,
        StaleKind::ClusterNetworkPolicy,
        StaleKind::ClusterInfoImport,
        StaleKind::ResourceExport,
    ];
}

impl fmt::Display for StaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ServicePair => "ServicePair",
            Self::ClusterNetworkPolicy => "ClusterNetworkPolicy",
            Self::ClusterInfoImport => "ClusterInfoImport",
            Self::ResourceExport => "ResourceExport",
        };
        f.write_str(s)
    }
}

/// Configuration for the stale resource controller
#[derive(Clone, Debug)]
pub struct StaleControllerConfig {
    /// Cluster set whose common area is authoritative
    pub cluster_set: String,
    /// Member namespace holding ClusterInfoImports
    pub namespace: String,
    /// Interval between periodic cleanups
    pub resync_interval: Duration,
    /// Deadline for each list or delete call
    pub call_timeout: Duration,
    /// How often to check for a leader connection before the first pass
    pub leader_poll_interval: Duration,
}

impl Default for StaleControllerConfig {
    fn default() -> Self {
        Self {
            cluster_set: String::new(),
            namespace: crate::DEFAULT_NAMESPACE.to_string(),
            resync_interval: DEFAULT_RESYNC_INTERVAL,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            leader_poll_interval: DEFAULT_LEADER_POLL_INTERVAL,
        }
    }
}

impl StaleControllerConfig {
    /// Config for a cluster set with default timings
    pub fn new(cluster_set: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            cluster_set: cluster_set.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.cluster_set.is_empty() {
            return Err(Error::validation("cluster set name must not be empty"));
        }
        if self.namespace.is_empty() {
            return Err(Error::validation("member namespace must not be empty"));
        }
        if self.resync_interval.is_zero() {
            return Err(Error::validation("resync interval must be greater than zero"));
        }
        if self.call_timeout.is_zero() {
            return Err(Error::validation("call timeout must be greater than zero"));
        }
        if self.leader_poll_interval.is_zero() {
            return Err(Error::validation(
                "leader poll interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Why a `cleanup()` call ran no pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The cluster set has no established leader connection
    NoLeaderConnection,
    /// Another `cleanup()` call was still in flight
    AlreadyRunning,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLeaderConnection => f.write_str("no leader connection"),
            Self::AlreadyRunning => f.write_str("another cleanup is already running"),
        }
    }
}

/// Outcome of one `cleanup()` call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Set when no pass ran
    pub skipped: Option<SkipReason>,
    /// Objects deleted per kind, for every pass that ran
    pub deleted: BTreeMap<StaleKind, usize>,
}

impl CleanupReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Default::default()
        }
    }

    /// True when no pass ran
    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    /// Objects deleted across all passes
    pub fn total_deleted(&self) -> usize {
        self.deleted.values().sum()
    }

    /// Objects deleted by one pass
    pub fn deleted(&self, kind: StaleKind) -> usize {
        self.deleted.get(&kind).copied().unwrap_or(0)
    }
}

/// Deletions performed by a pass that got past its listings
#[derive(Debug, Default)]
struct PassOutcome {
    deleted: usize,
    errors: Vec<Error>,
}

impl PassOutcome {
    fn record(&mut self, kind: impl fmt::Display, key: &ObjectKey, result: Result<(), Error>) {
        match result {
            Ok(()) => {
                info!(%kind, object = %key, "deleted stale object");
                self.deleted += 1;
            }
            Err(e) if e.is_not_found() => {
                debug!(%kind, object = %key, "stale object already gone");
            }
            Err(e) => {
                warn!(%kind, object = %key, error = %e, "failed to delete stale object");
                self.errors.push(e);
            }
        }
    }
}

// =============================================================================
// Pure diffs
// =============================================================================

/// Keys of owned candidates that no desired identity justifies
///
/// Unowned candidates are never returned; orphaned ones always are.
pub fn stale_objects<K, F>(
    desired: &HashSet<K>,
    candidates: &[ObjectMeta],
    classify: F,
) -> Vec<ObjectKey>
where
    K: Eq + Hash,
    F: Fn(&ObjectMeta) -> Ownership<K>,
{
    candidates
        .iter()
        .filter(|meta| classify(*meta).is_stale_given(|id| desired.contains(id)))
        .filter_map(ObjectKey::from_meta)
        .collect()
}

/// Keys of this cluster's ResourceExports that no local source justifies
///
/// `declared` holds the namespace/name of every local ServiceExport.
pub fn stale_exports(
    exports: &[ResourceExport],
    local_cluster_id: &str,
    declared: &HashSet<ObjectKey>,
) -> Vec<ObjectKey> {
    exports
        .iter()
        .filter(|export| {
            let Some(target) = classify_resource_export(export, local_cluster_id) else {
                return false;
            };
            match target.kind {
                ExportKind::Service | ExportKind::Endpoints => {
                    !declared.contains(&ObjectKey::namespaced(target.namespace, target.name))
                }
                // The cluster-info export path re-asserts its export after every pass
                ExportKind::ClusterInfo => true,
            }
        })
        .filter_map(|export| ObjectKey::from_meta(&export.metadata))
        .collect()
}

fn desired_identities<K, F>(imports: &[ResourceImport], target: F) -> HashSet<K>
where
    K: Eq + Hash,
    F: Fn(&ResourceImport) -> Option<K>,
{
    imports.iter().filter_map(target).collect()
}

// =============================================================================
// Controller
// =============================================================================

/// Garbage collector for shadow objects and exports whose source is gone
pub struct StaleController {
    config: StaleControllerConfig,
    local: Arc<dyn LocalClient>,
    manager: Arc<dyn CommonAreaManager>,
    guard: Mutex<()>,
    trigger: Notify,
}

impl StaleController {
    /// Create a controller after validating its configuration
    pub fn new(
        config: StaleControllerConfig,
        local: Arc<dyn LocalClient>,
        manager: Arc<dyn CommonAreaManager>,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            local,
            manager,
            guard: Mutex::new(()),
            trigger: Notify::new(),
        })
    }

    /// The controller's configuration
    pub fn config(&self) -> &StaleControllerConfig {
        &self.config
    }

    /// Run every pass once
    ///
    /// Passes run in [`StaleKind::ALL`] order and a failing pass does not stop
    /// the ones after it; every failure is returned together in
    /// [`Error::Cleanup`]. Without a leader connection nothing runs and the
    /// report carries [`SkipReason::NoLeaderConnection`]; a call that overlaps
    /// another returns [`SkipReason::AlreadyRunning`] immediately.
    #[instrument(skip(self), fields(cluster_set = %self.config.cluster_set))]
    pub async fn cleanup(&self) -> Result<CleanupReport, Error> {
        let Ok(_running) = self.guard.try_lock() else {
            debug!("cleanup already in progress, skipping");
            return Ok(CleanupReport::skipped(SkipReason::AlreadyRunning));
        };

        let Some(area) = self.manager.active_common_area(&self.config.cluster_set) else {
            info!("no leader connection, skipping stale resource cleanup");
            return Ok(CleanupReport::skipped(SkipReason::NoLeaderConnection));
        };
        let area = area.as_ref();

        let mut report = CleanupReport::default();
        let mut failures = Vec::new();

        for kind in StaleKind::ALL {
            let result = match kind {
                StaleKind::ServicePair => self.cleanup_services(area).await,
                StaleKind::ClusterNetworkPolicy => self.cleanup_policies(area).await,
                StaleKind::ClusterInfoImport => self.cleanup_cluster_info_imports(area).await,
                StaleKind::ResourceExport => self.cleanup_resource_exports(area).await,
            };
            match result {
                Ok(outcome) => {
                    debug!(%kind, deleted = outcome.deleted, "stale cleanup pass finished");
                    report.deleted.insert(kind, outcome.deleted);
                    failures.extend(
                        outcome
                            .errors
                            .into_iter()
                            .map(|error| PassFailure { kind, error }),
                    );
                }
                Err(error) => {
                    warn!(%kind, error = %error, "stale cleanup pass aborted");
                    failures.push(PassFailure { kind, error });
                }
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(Error::Cleanup(failures))
        }
    }

    /// Request a cleanup from a running [`run`](Self::run) loop
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Run cleanups until `shutdown` completes
    ///
    /// Waits for the cluster set's leader connection, cleans up once, then
    /// again on every resync tick and every [`trigger`](Self::trigger).
    pub async fn run<S>(self: Arc<Self>, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        while self
            .manager
            .active_common_area(&self.config.cluster_set)
            .is_none()
        {
            debug!(
                cluster_set = %self.config.cluster_set,
                retry_secs = self.config.leader_poll_interval.as_secs(),
                "waiting for leader connection"
            );
            tokio::select! {
                _ = &mut shutdown => return,
                _ = tokio::time::sleep(self.config.leader_poll_interval) => {}
            }
        }

        info!(
            cluster_set = %self.config.cluster_set,
            interval_secs = self.config.resync_interval.as_secs(),
            "starting stale resource controller"
        );

        let mut ticker = tokio::time::interval(self.config.resync_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("stale resource controller stopped");
                    return;
                }
                _ = ticker.tick() => {}
                _ = self.trigger.notified() => {
                    debug!("on-demand cleanup requested");
                }
            }

            match self.cleanup().await {
                Ok(report) if report.is_skipped() => {}
                Ok(report) => {
                    info!(deleted = report.total_deleted(), "stale resource cleanup complete");
                }
                Err(e) => {
                    error!(error = %e, "stale resource cleanup failed, will retry next cycle");
                }
            }
        }
    }

    async fn bounded<T, F>(&self, what: impl fmt::Display, call: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(format!(
                "{} did not complete within {:?}",
                what, self.config.call_timeout
            ))),
        }
    }

    async fn list_imports(&self, area: &dyn CommonArea) -> Result<Vec<ResourceImport>, Error> {
        self.bounded("list ResourceImports", area.list_resource_imports())
            .await
    }

    async fn list_local(
        &self,
        kind: LocalKind,
        scope: ListScope,
    ) -> Result<Vec<ObjectMeta>, Error> {
        self.bounded(format!("list {kind}"), self.local.list(kind, scope))
            .await
    }

    async fn delete_local(&self, kind: LocalKind, keys: Vec<ObjectKey>, outcome: &mut PassOutcome) {
        for key in keys {
            let result = self
                .bounded(format!("delete {kind} {key}"), self.local.delete(kind, &key))
                .await;
            outcome.record(kind, &key, result);
        }
    }

    /// Derived Services and ServiceImports: one ServiceImport-kind
    /// ResourceImport keeps both objects of its target
    #[instrument(skip_all)]
    async fn cleanup_services(&self, area: &dyn CommonArea) -> Result<PassOutcome, Error> {
        let imports = self.list_imports(area).await?;
        let services = self.list_local(LocalKind::Service, ListScope::All).await?;
        let service_imports = self
            .list_local(LocalKind::ServiceImport, ListScope::All)
            .await?;

        let desired = desired_identities(&imports, imported_service_target);
        let stale_services = stale_objects(&desired, &services, classify_imported_service);
        let stale_service_imports =
            stale_objects(&desired, &service_imports, classify_service_import);

        let mut outcome = PassOutcome::default();
        self.delete_local(LocalKind::Service, stale_services, &mut outcome)
            .await;
        self.delete_local(LocalKind::ServiceImport, stale_service_imports, &mut outcome)
            .await;
        Ok(outcome)
    }

    #[instrument(skip_all)]
    async fn cleanup_policies(&self, area: &dyn CommonArea) -> Result<PassOutcome, Error> {
        let imports = self.list_imports(area).await?;
        let policies = self
            .list_local(LocalKind::ClusterNetworkPolicy, ListScope::All)
            .await?;

        let desired = desired_identities(&imports, imported_policy_target);
        let stale = stale_objects(&desired, &policies, classify_imported_policy);

        let mut outcome = PassOutcome::default();
        self.delete_local(LocalKind::ClusterNetworkPolicy, stale, &mut outcome)
            .await;
        Ok(outcome)
    }

    /// ClusterInfoImports survive on name alone; payloads are not compared
    #[instrument(skip_all)]
    async fn cleanup_cluster_info_imports(
        &self,
        area: &dyn CommonArea,
    ) -> Result<PassOutcome, Error> {
        let imports = self.list_imports(area).await?;
        let namespace = self.config.namespace.as_str();
        let cluster_info_imports = self
            .list_local(
                LocalKind::ClusterInfoImport,
                ListScope::Namespace(namespace.to_string()),
            )
            .await?;

        let desired = desired_identities(&imports, imported_cluster_info_target);
        let stale = stale_objects(&desired, &cluster_info_imports, |meta| {
            classify_cluster_info_import(meta, namespace)
        });

        let mut outcome = PassOutcome::default();
        self.delete_local(LocalKind::ClusterInfoImport, stale, &mut outcome)
            .await;
        Ok(outcome)
    }

    /// This cluster's exports in the common area, kept only while a local
    /// ServiceExport still declares them
    #[instrument(skip_all)]
    async fn cleanup_resource_exports(&self, area: &dyn CommonArea) -> Result<PassOutcome, Error> {
        let Some(local_cluster_id) = self.manager.local_cluster_id() else {
            warn!("local cluster ID unknown, no ResourceExport can be attributed to this cluster");
            return Ok(PassOutcome::default());
        };

        let exports = self
            .bounded("list ResourceExports", area.list_resource_exports())
            .await?;
        let service_exports = self
            .list_local(LocalKind::ServiceExport, ListScope::All)
            .await?;

        let declared: HashSet<ObjectKey> = service_exports
            .iter()
            .filter_map(ObjectKey::from_meta)
            .collect();
        let stale = stale_exports(&exports, &local_cluster_id, &declared);

        let mut outcome = PassOutcome::default();
        for key in stale {
            let result = self
                .bounded(
                    format!("delete ResourceExport {key}"),
                    area.delete_resource_export(&key),
                )
                .await;
            outcome.record("ResourceExport", &key, result);
        }
        Ok(outcome)
    }
}
