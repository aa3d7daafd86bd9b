//! Error types for the stale resource reconciler

use thiserror::Error;

use crate::controller::StaleKind;

/// Main error type for mcsync operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Object already gone (reported by accessors that are not kube-backed)
    #[error("not found: {0}")]
    NotFound(String),

    /// A list or delete call exceeded its deadline
    #[error("timeout: {0}")]
    Timeout(String),

    /// Leader cluster unreachable
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// Invalid configuration
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// One or more cleanup passes failed
    #[error("stale resource cleanup failed: {}", join_failures(.0))]
    Cleanup(Vec<PassFailure>),
}

/// A failed cleanup pass and its cause
#[derive(Debug)]
pub struct PassFailure {
    /// Pass that failed
    pub kind: StaleKind,
    /// What went wrong
    pub error: Error,
}

fn join_failures(failures: &[PassFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("[{}] {}", f.kind, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create a not-found error for the given object
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a timeout error with the given message
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a connectivity error with the given message
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// True when the error means the target object no longer exists
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Kube(kube::Error::Api(ae)) => ae.code == 404,
            _ => false,
        }
    }
}
