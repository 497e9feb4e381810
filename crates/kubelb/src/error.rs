//! Core error types.

use kubelb_store::StoreError;
use thiserror::Error;

/// Errors raised by the shared mapping and reconciliation primitives.
#[derive(Debug, Error)]
pub enum KubeLbError {
    /// Object store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Source object lacks a field the mapping needs
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Snapshot cache failure
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}
