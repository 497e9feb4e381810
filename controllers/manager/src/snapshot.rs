//! Data-plane snapshot reconciliation.
//!
//! The snapshot of a tenant is the full set of live LoadBalancers in its
//! namespace, so every event re-derives it from a fresh list.

use crate::error::ControllerError;
use crds::LoadBalancer;
use kubelb::snapshot::snapshot_resources;
use kubelb::SnapshotCache;
use kubelb_store::ObjectStore;
use std::sync::Arc;
use tracing::debug;

/// Rebuilds per-tenant data-plane snapshots from the listed LoadBalancers.
pub struct SnapshotReconciler {
    load_balancers: Arc<dyn ObjectStore<LoadBalancer>>,
    cache: Arc<dyn SnapshotCache>,
}

impl SnapshotReconciler {
    pub fn new(load_balancers: Arc<dyn ObjectStore<LoadBalancer>>, cache: Arc<dyn SnapshotCache>) -> Self {
        Self {
            load_balancers,
            cache,
        }
    }

    /// Pushes the snapshot of tenant `namespace` and returns its version.
    pub async fn reconcile_namespace(&self, namespace: &str) -> Result<u64, ControllerError> {
        let load_balancers = self.load_balancers.list(namespace).await?;
        let resources = snapshot_resources(&load_balancers);
        let count = resources.len();
        let version = self.cache.set_snapshot(namespace, resources)?;
        debug!("Snapshot for {} at version {} ({} LoadBalancers)", namespace, version, count);
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_load_balancer;
    use kubelb::InMemorySnapshotCache;
    use kubelb_store::{Failure, MockStore, Operation};

    fn reconciler() -> (SnapshotReconciler, MockStore<LoadBalancer>, Arc<InMemorySnapshotCache>) {
        let store = MockStore::<LoadBalancer>::new();
        let cache = Arc::new(InMemorySnapshotCache::new());
        let reconciler = SnapshotReconciler::new(Arc::new(store.clone()), Arc::clone(&cache) as Arc<dyn SnapshotCache>);
        (reconciler, store, cache)
    }

    #[tokio::test]
    async fn test_snapshot_per_tenant_namespace() {
        let (reconciler, store, cache) = reconciler();
        store.insert(create_test_load_balancer("tenant-a", "uid-2", 443));
        store.insert(create_test_load_balancer("tenant-a", "uid-1", 80));
        store.insert(create_test_load_balancer("tenant-b", "uid-3", 80));

        reconciler.reconcile_namespace("tenant-a").await.unwrap();

        let (_, resources) = cache.snapshot("tenant-a").unwrap();
        let names: Vec<_> = resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["uid-1", "uid-2"]);
        assert!(cache.snapshot("tenant-b").is_none());
    }

    #[tokio::test]
    async fn test_unchanged_resources_keep_version() {
        let (reconciler, store, _) = reconciler();
        store.insert(create_test_load_balancer("tenant-a", "uid-1", 80));

        let first = reconciler.reconcile_namespace("tenant-a").await.unwrap();
        let second = reconciler.reconcile_namespace("tenant-a").await.unwrap();
        assert_eq!(first, second);

        store.insert(create_test_load_balancer("tenant-a", "uid-2", 80));
        let third = reconciler.reconcile_namespace("tenant-a").await.unwrap();
        assert_eq!(third, first + 1);
    }

    #[tokio::test]
    async fn test_list_failure_surfaces() {
        let (reconciler, store, cache) = reconciler();
        store.fail_next(Operation::List, Failure::Unavailable);

        assert!(reconciler.reconcile_namespace("tenant-a").await.is_err());
        assert!(cache.snapshot("tenant-a").is_none());
    }
}
