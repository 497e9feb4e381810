//! `kube::Api` backed object store

use crate::error::StoreError;
use crate::store_trait::{object_key, ObjectStore};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::trace;

/// Object store talking to an API server through a `kube::Client`.
pub struct KubeStore<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for KubeStore<K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K> KubeStore<K>
where
    K: Resource<Scope = NamespaceResourceScope>,
    K::DynamicType: Default,
{
    /// Creates a store for kind `K` using `client`.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    fn api(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Full object body for a status replace. Fields left unset in `object`
/// are cleared on the server, and its resourceVersion is the precondition.
fn status_body<K: Serialize>(object: &K) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec(object)?)
}

/// Maps API status codes onto the store error taxonomy.
fn map_error(err: kube::Error, key: &str) -> StoreError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => StoreError::NotFound(key.to_string()),
        kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
            StoreError::AlreadyExists(key.to_string())
        }
        kube::Error::Api(ae) if ae.code == 409 => {
            StoreError::Conflict(format!("{key}: {}", ae.message))
        }
        kube::Error::Api(ae) if ae.code >= 500 => {
            StoreError::Unavailable(format!("{key}: {}", ae.message))
        }
        other => StoreError::Kube(other),
    }
}

#[async_trait::async_trait]
impl<K> ObjectStore<K> for KubeStore<K>
where
    K: Resource<Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
    K::DynamicType: Default,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<K, StoreError> {
        trace!(namespace, name, "get");
        self.api(namespace)
            .get(name)
            .await
            .map_err(|e| map_error(e, &format!("{namespace}/{name}")))
    }

    async fn list(&self, namespace: &str) -> Result<Vec<K>, StoreError> {
        trace!(namespace, "list");
        let list = self
            .api(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| map_error(e, namespace))?;
        Ok(list.items)
    }

    async fn create(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_key(object)?;
        trace!(%namespace, %name, "create");
        self.api(&namespace)
            .create(&PostParams::default(), object)
            .await
            .map_err(|e| map_error(e, &format!("{namespace}/{name}")))
    }

    async fn update(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_key(object)?;
        trace!(%namespace, %name, "update");
        self.api(&namespace)
            .replace(&name, &PostParams::default(), object)
            .await
            .map_err(|e| map_error(e, &format!("{namespace}/{name}")))
    }

    async fn update_status(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_key(object)?;
        trace!(%namespace, %name, "update status");
        self.api(&namespace)
            .replace_status(&name, &PostParams::default(), status_body(object)?)
            .await
            .map_err(|e| map_error(e, &format!("{namespace}/{name}")))
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        trace!(namespace, name, "delete");
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| map_error(e, &format!("{namespace}/{name}")))
    }
}
