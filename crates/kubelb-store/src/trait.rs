//! ObjectStore trait for mocking
//!
//! Generic Get/List/Create/Update/Delete primitives over one Kubernetes kind.
//! The concrete [`crate::KubeStore`] implements this trait against the API
//! server, tests use [`crate::MockStore`].

use crate::error::StoreError;
use kube::{Resource, ResourceExt};

/// Namespaced object store for kind `K`.
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ObjectStore<K>: Send + Sync
where
    K: Send + Sync + 'static,
{
    /// Fetches the latest version of `namespace/name`.
    async fn get(&self, namespace: &str, name: &str) -> Result<K, StoreError>;

    /// Lists every object in `namespace`.
    async fn list(&self, namespace: &str) -> Result<Vec<K>, StoreError>;

    /// Creates `object`; fails with `AlreadyExists` if the identity is taken.
    async fn create(&self, object: &K) -> Result<K, StoreError>;

    /// Replaces `object`; fails with `Conflict` if its resourceVersion is stale.
    async fn update(&self, object: &K) -> Result<K, StoreError>;

    /// Writes the status sub-resource of `object`, guarded by its resourceVersion.
    async fn update_status(&self, object: &K) -> Result<K, StoreError>;

    /// Deletes `namespace/name`.
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError>;
}

/// Namespace and name of a namespaced object.
pub fn object_key<K: Resource>(object: &K) -> Result<(String, String), StoreError> {
    let name = object
        .meta()
        .name
        .clone()
        .ok_or_else(|| StoreError::InvalidObject("object has no name".to_string()))?;
    let namespace = object
        .namespace()
        .ok_or_else(|| StoreError::InvalidObject(format!("object {name} has no namespace")))?;
    Ok((namespace, name))
}
