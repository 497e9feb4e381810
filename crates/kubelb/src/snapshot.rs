//! Data-plane snapshot bridge
//!
//! The manager hands the proxy one resource set per tenant namespace.
//! [`SnapshotCache`] is the seam to the snapshot engine; the version only
//! moves when the resource set changes.

use crate::error::KubeLbError;
use crds::{LoadBalancer, LoadBalancerSpec};
use std::collections::HashMap;
use std::sync::Mutex;

/// One LoadBalancer as the data plane sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotResource {
    pub name: String,
    pub spec: LoadBalancerSpec,
}

/// Receives the final resource set for a tenant.
pub trait SnapshotCache: Send + Sync {
    /// Replaces the snapshot of `cluster_id` and returns its version.
    /// Identical resource sets keep the current version.
    fn set_snapshot(
        &self,
        cluster_id: &str,
        resources: Vec<SnapshotResource>,
    ) -> Result<u64, KubeLbError>;
}

#[derive(Debug, Default)]
struct Snapshot {
    version: u64,
    resources: Vec<SnapshotResource>,
}

/// Versioned snapshots kept in process memory.
#[derive(Debug, Default)]
pub struct InMemorySnapshotCache {
    snapshots: Mutex<HashMap<String, Snapshot>>,
}

impl InMemorySnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version and resource set of `cluster_id`.
    pub fn snapshot(&self, cluster_id: &str) -> Option<(u64, Vec<SnapshotResource>)> {
        let snapshots = self.snapshots.lock().ok()?;
        snapshots
            .get(cluster_id)
            .map(|snapshot| (snapshot.version, snapshot.resources.clone()))
    }
}

impl SnapshotCache for InMemorySnapshotCache {
    fn set_snapshot(
        &self,
        cluster_id: &str,
        resources: Vec<SnapshotResource>,
    ) -> Result<u64, KubeLbError> {
        let mut snapshots = self
            .snapshots
            .lock()
            .map_err(|e| KubeLbError::Snapshot(format!("snapshot cache poisoned: {e}")))?;
        let snapshot = snapshots.entry(cluster_id.to_string()).or_default();
        if snapshot.version == 0 || snapshot.resources != resources {
            snapshot.version += 1;
            snapshot.resources = resources;
        }
        Ok(snapshot.version)
    }
}

/// Snapshot resources for the LoadBalancers of one tenant, sorted by name.
/// Objects already being deleted are left out.
pub fn snapshot_resources(load_balancers: &[LoadBalancer]) -> Vec<SnapshotResource> {
    let mut resources: Vec<SnapshotResource> = load_balancers
        .iter()
        .filter(|lb| lb.metadata.deletion_timestamp.is_none())
        .filter_map(|lb| {
            lb.metadata.name.clone().map(|name| SnapshotResource {
                name,
                spec: lb.spec.clone(),
            })
        })
        .collect();
    resources.sort_by(|a, b| a.name.cmp(&b.name));
    resources
}
