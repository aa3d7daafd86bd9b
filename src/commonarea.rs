//! Access to a cluster set's common area in the leader cluster
//!
//! The connectivity layer owns leader sessions. It registers a [`CommonArea`]
//! for a cluster set once the leader is reachable and removes it when the
//! session drops; the reconciler only ever asks for the currently active one.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kube::api::{Api, DeleteParams, ListParams};
use kube::Client;
use parking_lot::RwLock;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::crd::{ResourceExport, ResourceImport};
use crate::naming::ObjectKey;
use crate::Error;

/// Trait abstracting the leader's common-area namespace
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommonArea: Send + Sync {
    /// List every ResourceImport visible to this member
    async fn list_resource_imports(&self) -> Result<Vec<ResourceImport>, Error>;

    /// List every ResourceExport in the common area, from all members
    async fn list_resource_exports(&self) -> Result<Vec<ResourceExport>, Error>;

    /// Delete one ResourceExport
    ///
    /// May report a missing object either as `Ok(())` or as an error for
    /// which [`Error::is_not_found`] holds.
    async fn delete_resource_export(&self, key: &ObjectKey) -> Result<(), Error>;
}

/// Trait abstracting the leader connectivity manager
#[cfg_attr(test, automock)]
pub trait CommonAreaManager: Send + Sync {
    /// ID of the local member cluster, `None` until it is known
    fn local_cluster_id(&self) -> Option<String>;

    /// Common area of `cluster_set`, `None` while no leader connection is
    /// established
    fn active_common_area(&self, cluster_set: &str) -> Option<Arc<dyn CommonArea>>;
}

/// Common area backed by a kube client connected to the leader
pub struct KubeCommonArea {
    client: Client,
    namespace: String,
}

impl KubeCommonArea {
    /// Create a common area accessor for `namespace` in the leader cluster
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl CommonArea for KubeCommonArea {
    async fn list_resource_imports(&self) -> Result<Vec<ResourceImport>, Error> {
        let api: Api<ResourceImport> = Api::namespaced(self.client.clone(), &self.namespace);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn list_resource_exports(&self) -> Result<Vec<ResourceExport>, Error> {
        let api: Api<ResourceExport> = Api::namespaced(self.client.clone(), &self.namespace);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn delete_resource_export(&self, key: &ObjectKey) -> Result<(), Error> {
        let ns = key.namespace.as_deref().unwrap_or(&self.namespace);
        let api: Api<ResourceExport> = Api::namespaced(self.client.clone(), ns);
        api.delete(&key.name, &DeleteParams::default()).await?;
        Ok(())
    }
}

/// In-process registry of active common areas, keyed by cluster set
///
/// Cloning shares the registry.
#[derive(Clone)]
pub struct SharedCommonAreaManager {
    local_cluster_id: Arc<RwLock<Option<String>>>,
    areas: Arc<RwLock<HashMap<String, Arc<dyn CommonArea>>>>,
}

impl SharedCommonAreaManager {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            local_cluster_id: Arc::new(RwLock::new(None)),
            areas: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record the local cluster's ID
    pub fn set_local_cluster_id(&self, id: impl Into<String>) {
        *self.local_cluster_id.write() = Some(id.into());
    }

    /// Register the common area of a now-connected cluster set
    pub fn register(&self, cluster_set: impl Into<String>, area: Arc<dyn CommonArea>) {
        let cluster_set = cluster_set.into();
        info!(cluster_set = %cluster_set, "leader connection established");
        self.areas.write().insert(cluster_set, area);
    }

    /// Forget a cluster set's common area after its leader session dropped
    pub fn unregister(&self, cluster_set: &str) {
        if self.areas.write().remove(cluster_set).is_some() {
            info!(cluster_set = %cluster_set, "leader connection lost");
        } else {
            debug!(cluster_set = %cluster_set, "no leader connection to remove");
        }
    }
}

impl Default for SharedCommonAreaManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CommonAreaManager for SharedCommonAreaManager {
    fn local_cluster_id(&self) -> Option<String> {
        self.local_cluster_id.read().clone()
    }

    fn active_common_area(&self, cluster_set: &str) -> Option<Arc<dyn CommonArea>> {
        self.areas.read().get(cluster_set).cloned()
    }
}
