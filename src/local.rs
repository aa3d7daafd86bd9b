//! Local cluster object access
//!
//! The reconciler only needs metadata to decide ownership, so listings are
//! returned as `ObjectMeta`. The trait keeps the reconciler testable without
//! an API server.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, ListParams};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::crd::{ClusterInfoImport, ClusterNetworkPolicy, ServiceExport, ServiceImport};
use crate::naming::ObjectKey;
use crate::Error;

/// Local object types the reconciler lists or deletes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocalKind {
    /// core/v1 Service
    Service,
    /// MCS ServiceImport
    ServiceImport,
    /// MCS ServiceExport (source object, never deleted)
    ServiceExport,
    /// Cluster-scoped network policy
    ClusterNetworkPolicy,
    /// ClusterInfoImport
    ClusterInfoImport,
}

impl std::fmt::Display for LocalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Service => "Service",
            Self::ServiceImport => "ServiceImport",
            Self::ServiceExport => "ServiceExport",
            Self::ClusterNetworkPolicy => "ClusterNetworkPolicy",
            Self::ClusterInfoImport => "ClusterInfoImport",
        };
        f.write_str(s)
    }
}

/// Where to list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListScope {
    /// Every namespace (or the whole cluster for cluster-scoped kinds)
    All,
    /// A single namespace
    Namespace(String),
}

/// Trait abstracting local cluster list/delete operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocalClient: Send + Sync {
    /// List metadata of every object of `kind` within `scope`
    async fn list(&self, kind: LocalKind, scope: ListScope) -> Result<Vec<ObjectMeta>, Error>;

    /// Delete one object
    ///
    /// May report a missing object either as `Ok(())` or as an error for
    /// which [`Error::is_not_found`] holds.
    async fn delete(&self, kind: LocalKind, key: &ObjectKey) -> Result<(), Error>;
}

/// Real Kubernetes client implementation
pub struct KubeLocalClient {
    client: Client,
}

impl KubeLocalClient {
    /// Create a new KubeLocalClient wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list_namespaced<K>(&self, scope: &ListScope) -> Result<Vec<ObjectMeta>, Error>
    where
        K: Resource<DynamicType = (), Scope = kube::core::NamespaceResourceScope>
            + Clone
            + DeserializeOwned
            + std::fmt::Debug,
    {
        let api: Api<K> = match scope {
            ListScope::All => Api::all(self.client.clone()),
            ListScope::Namespace(ns) => Api::namespaced(self.client.clone(), ns),
        };
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.into_iter().map(|o| o.meta().clone()).collect())
    }

    async fn delete_namespaced<K>(&self, key: &ObjectKey) -> Result<(), Error>
    where
        K: Resource<DynamicType = (), Scope = kube::core::NamespaceResourceScope>
            + Clone
            + DeserializeOwned
            + std::fmt::Debug,
    {
        let ns = key
            .namespace
            .as_deref()
            .ok_or_else(|| Error::validation(format!("{} is missing a namespace", key)))?;
        let api: Api<K> = Api::namespaced(self.client.clone(), ns);
        api.delete(&key.name, &DeleteParams::default()).await?;
        Ok(())
    }
}

#[async_trait]
impl LocalClient for KubeLocalClient {
    async fn list(&self, kind: LocalKind, scope: ListScope) -> Result<Vec<ObjectMeta>, Error> {
        debug!(%kind, ?scope, "listing local objects");
        match kind {
            LocalKind::Service => self.list_namespaced::<Service>(&scope).await,
            LocalKind::ServiceImport => self.list_namespaced::<ServiceImport>(&scope).await,
            LocalKind::ServiceExport => self.list_namespaced::<ServiceExport>(&scope).await,
            LocalKind::ClusterInfoImport => {
                self.list_namespaced::<ClusterInfoImport>(&scope).await
            }
            LocalKind::ClusterNetworkPolicy => {
                let api: Api<ClusterNetworkPolicy> = Api::all(self.client.clone());
                let list = api.list(&ListParams::default()).await?;
                Ok(list.items.into_iter().map(|p| p.metadata).collect())
            }
        }
    }

    async fn delete(&self, kind: LocalKind, key: &ObjectKey) -> Result<(), Error> {
        match kind {
            LocalKind::Service => self.delete_namespaced::<Service>(key).await,
            LocalKind::ServiceImport => self.delete_namespaced::<ServiceImport>(key).await,
            LocalKind::ClusterInfoImport => {
                self.delete_namespaced::<ClusterInfoImport>(key).await
            }
            LocalKind::ClusterNetworkPolicy => {
                let api: Api<ClusterNetworkPolicy> = Api::all(self.client.clone());
                api.delete(&key.name, &DeleteParams::default()).await?;
                Ok(())
            }
            LocalKind::ServiceExport => Err(Error::validation(
                "ServiceExports are source objects and are never deleted by mcsync",
            )),
        }
    }
}
