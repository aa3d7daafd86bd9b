//! mcsync - stale resource reconciler for multi-cluster federation
//!
//! A member cluster of a cluster set mirrors what the leader's common area
//! says: imported Services and ServiceImports, cluster-scoped policies and
//! ClusterInfoImports are created from ResourceImports, and the member's own
//! ServiceExports are published back as ResourceExports. The event-driven
//! controllers that do this miss deletes that happen while they are down.
//! mcsync periodically diffs both directions against the authoritative source
//! and removes what is left over.
//!
//! # Modules
//!
//! - [`crd`] - Custom Resource Definitions (ResourceImport, ResourceExport, etc.)
//! - [`naming`] - Ownership classification and identity derivation
//! - [`local`] - Local cluster list/delete access
//! - [`commonarea`] - Leader common-area access and connection registry
//! - [`controller`] - Stale resource cleanup passes and periodic runner
//! - [`kube_utils`] - Kubernetes client construction
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod commonarea;
pub mod controller;
pub mod crd;
pub mod error;
pub mod kube_utils;
pub mod local;
pub mod naming;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// Default member namespace for ClusterInfoImports
pub const DEFAULT_NAMESPACE: &str = "mcsync-system";

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "mcsync-controller";
