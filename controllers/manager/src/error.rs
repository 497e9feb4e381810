//! Controller-specific error types.

use kube::Error as KubeError;
use kubelb::KubeLbError;
use kubelb_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the KubeLB Manager.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes client error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Object store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Mapping, reconciliation or snapshot error
    #[error("KubeLB error: {0}")]
    KubeLb(#[from] KubeLbError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
