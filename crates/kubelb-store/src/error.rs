//! Object store errors

use thiserror::Error;

/// Errors returned by [`crate::ObjectStore`] operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Kubernetes API or transport error not covered by a more specific variant
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Object with the same identity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Optimistic concurrency check failed (stale resourceVersion)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Server-side failure worth retrying later
    #[error("Server unavailable: {0}")]
    Unavailable(String),

    /// Object is missing identity metadata required by the operation
    #[error("Invalid object: {0}")]
    InvalidObject(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// True for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True for [`StoreError::Conflict`].
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
