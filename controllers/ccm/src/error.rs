//! Controller-specific error types.

use kube::Error as KubeError;
use kubelb::KubeLbError;
use kubelb_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the KubeLB Cloud Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes client error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Object store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Mapping or reconciliation primitive error
    #[error("KubeLB error: {0}")]
    KubeLb(#[from] KubeLbError),

    /// Management cluster kubeconfig could not be loaded
    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Deleting the downstream LoadBalancer failed; the finalizer stays
    #[error("Failed to delete LoadBalancer {0}: {1}")]
    Cleanup(String, #[source] StoreError),

    /// Service status could not be written
    #[error("Failed to update status of Service {0}: {1}")]
    StatusUpdate(String, #[source] StoreError),
}
