//! In-memory ObjectStore for unit testing
//!
//! Behaves like a single API server for one kind:
//! - `create` assigns a UID and resourceVersion
//! - `update`/`update_status` enforce resourceVersion preconditions
//! - `update` never touches status, `update_status` touches nothing else
//! - `delete` on an object with finalizers only sets `deletionTimestamp`;
//!   the object disappears once an update clears the last finalizer
//!
//! Every successful write is appended to a journal that can be shared
//! between stores, so tests can assert ordering across kinds.

use crate::error::StoreError;
use crate::store_trait::{object_key, ObjectStore};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Timestamp stamped on objects whose deletion is blocked by finalizers.
const DELETION_TIMESTAMP: &str = "2024-01-01T00:00:00Z";

/// Store operation, used to target failure injection and in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    List,
    Create,
    Update,
    UpdateStatus,
    Delete,
}

/// Failure injected into the next call of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Respond with `StoreError::Conflict`
    Conflict,
    /// Respond with `StoreError::Unavailable`
    Unavailable,
}

/// A successful write, as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOp {
    pub kind: String,
    pub operation: Operation,
    pub namespace: String,
    pub name: String,
}

type Journal = Arc<Mutex<Vec<WriteOp>>>;

/// Mock object store for kind `K`
#[derive(Clone)]
pub struct MockStore<K> {
    objects: Arc<Mutex<BTreeMap<(String, String), K>>>,
    failures: Arc<Mutex<HashMap<Operation, VecDeque<Failure>>>>,
    journal: Journal,
    next_version: Arc<Mutex<u64>>,
}

impl<K> Default for MockStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> MockStore<K> {
    /// Create an empty store with its own journal
    pub fn new() -> Self {
        Self::with_journal(Arc::new(Mutex::new(Vec::new())))
    }

    /// Create an empty store that records into `other`'s journal
    pub fn sharing_journal<O>(other: &MockStore<O>) -> Self {
        Self::with_journal(Arc::clone(&other.journal))
    }

    fn with_journal(journal: Journal) -> Self {
        Self {
            objects: Arc::new(Mutex::new(BTreeMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            journal,
            next_version: Arc::new(Mutex::new(1)),
        }
    }

    /// Make the next call of `operation` fail with `failure`.
    /// Calls queue up, so injecting twice fails the next two calls.
    pub fn fail_next(&self, operation: Operation, failure: Failure) {
        self.failures
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(failure);
    }

    /// All writes recorded in the (possibly shared) journal, oldest first
    pub fn writes(&self) -> Vec<WriteOp> {
        self.journal.lock().unwrap().clone()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// True when the store holds no objects
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn injected(&self, operation: Operation, key: &str) -> Result<(), StoreError> {
        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        match failure {
            None => Ok(()),
            Some(Failure::Conflict) => Err(StoreError::Conflict(format!("{key}: injected"))),
            Some(Failure::Unavailable) => Err(StoreError::Unavailable(format!("{key}: injected"))),
        }
    }

    fn bump_version(&self) -> String {
        let mut next = self.next_version.lock().unwrap();
        let version = next.to_string();
        *next += 1;
        version
    }
}

impl<K> MockStore<K>
where
    K: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned,
{
    /// Seed an object (test setup); assigns a resourceVersion if missing
    pub fn insert(&self, mut object: K) {
        let (namespace, name) = object_key(&object).unwrap();
        if object.meta().resource_version.is_none() {
            object.meta_mut().resource_version = Some(self.bump_version());
        }
        self.objects.lock().unwrap().insert((namespace, name), object);
    }

    /// Current stored version of `namespace/name`
    pub fn object(&self, namespace: &str, name: &str) -> Option<K> {
        self.objects
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    fn record(&self, operation: Operation, namespace: &str, name: &str) {
        self.journal.lock().unwrap().push(WriteOp {
            kind: K::kind(&()).to_string(),
            operation,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
    }

    fn check_version(stored: &K, incoming: &K, key: &str) -> Result<(), StoreError> {
        match &incoming.meta().resource_version {
            Some(version) if Some(version) != stored.meta().resource_version.as_ref() => Err(
                StoreError::Conflict(format!("{key}: resourceVersion {version} is stale")),
            ),
            _ => Ok(()),
        }
    }
}

/// Copy the `status` field of `from` onto `onto` (removing it when `from` has none).
fn with_status_of<K: Serialize + DeserializeOwned>(onto: &K, from: &K) -> Result<K, StoreError> {
    let mut target = serde_json::to_value(onto)?;
    let status = serde_json::to_value(from)?.get("status").cloned();
    if let Some(fields) = target.as_object_mut() {
        match status {
            Some(Value::Null) | None => {
                fields.remove("status");
            }
            Some(status) => {
                fields.insert("status".to_string(), status);
            }
        }
    }
    Ok(serde_json::from_value(target)?)
}

#[async_trait::async_trait]
impl<K> ObjectStore<K> for MockStore<K>
where
    K: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<K, StoreError> {
        let key = format!("{namespace}/{name}");
        self.injected(Operation::Get, &key)?;
        self.object(namespace, name).ok_or(StoreError::NotFound(key))
    }

    async fn list(&self, namespace: &str) -> Result<Vec<K>, StoreError> {
        self.injected(Operation::List, namespace)?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, object)| object.clone())
            .collect())
    }

    async fn create(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_key(object)?;
        let key = format!("{namespace}/{name}");
        self.injected(Operation::Create, &key)?;

        if self.object(&namespace, &name).is_some() {
            return Err(StoreError::AlreadyExists(key));
        }

        let mut created = object.clone();
        let meta = created.meta_mut();
        if meta.uid.is_none() {
            meta.uid = Some(uuid::Uuid::new_v4().to_string());
        }
        meta.resource_version = Some(self.bump_version());

        self.objects
            .lock()
            .unwrap()
            .insert((namespace.clone(), name.clone()), created.clone());
        self.record(Operation::Create, &namespace, &name);
        Ok(created)
    }

    async fn update(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_key(object)?;
        let key = format!("{namespace}/{name}");
        self.injected(Operation::Update, &key)?;

        let stored = self
            .object(&namespace, &name)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        Self::check_version(&stored, object, &key)?;

        let mut updated = with_status_of(object, &stored)?;
        let meta = updated.meta_mut();
        meta.uid.clone_from(&stored.meta().uid);
        meta.deletion_timestamp.clone_from(&stored.meta().deletion_timestamp);
        meta.resource_version = Some(self.bump_version());

        let released = updated.meta().deletion_timestamp.is_some()
            && updated.meta().finalizers.as_ref().is_none_or(Vec::is_empty);
        {
            let mut objects = self.objects.lock().unwrap();
            if released {
                objects.remove(&(namespace.clone(), name.clone()));
            } else {
                objects.insert((namespace.clone(), name.clone()), updated.clone());
            }
        }
        self.record(Operation::Update, &namespace, &name);
        Ok(updated)
    }

    async fn update_status(&self, object: &K) -> Result<K, StoreError> {
        let (namespace, name) = object_key(object)?;
        let key = format!("{namespace}/{name}");
        self.injected(Operation::UpdateStatus, &key)?;

        let stored = self
            .object(&namespace, &name)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        Self::check_version(&stored, object, &key)?;

        let mut updated = with_status_of(&stored, object)?;
        updated.meta_mut().resource_version = Some(self.bump_version());

        self.objects
            .lock()
            .unwrap()
            .insert((namespace.clone(), name.clone()), updated.clone());
        self.record(Operation::UpdateStatus, &namespace, &name);
        Ok(updated)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let key = format!("{namespace}/{name}");
        self.injected(Operation::Delete, &key)?;

        let mut stored = self
            .object(namespace, name)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;

        let blocked = stored.meta().finalizers.as_ref().is_some_and(|f| !f.is_empty());
        {
            let mut objects = self.objects.lock().unwrap();
            if blocked {
                if stored.meta().deletion_timestamp.is_none() {
                    stored.meta_mut().deletion_timestamp =
                        Some(serde_json::from_value::<Time>(Value::String(DELETION_TIMESTAMP.to_string()))?);
                }
                stored.meta_mut().resource_version = Some(self.bump_version());
                objects.insert((namespace.to_string(), name.to_string()), stored);
            } else {
                objects.remove(&(namespace.to_string(), name.to_string()));
            }
        }
        self.record(Operation::Delete, namespace, name);
        Ok(())
    }
}
