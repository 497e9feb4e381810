//! KubeLB core
//!
//! Pieces shared by the tenant-side cloud controller and the management-side
//! manager:
//! - `annotations`: annotation matching used to decide which objects are in scope
//! - `mapper`: desired-state mapping between Services and LoadBalancers
//! - `ingress`: the legacy ingress resource kinds behind one variant
//! - `reconcile`: the generic fetch-compare-create/update algorithm
//! - `snapshot`: the data-plane snapshot bridge
//! - `backoff`: requeue backoff and bounded conflict retry

pub mod annotations;
pub mod backoff;
pub mod error;
pub mod ingress;
pub mod mapper;
pub mod reconcile;
pub mod snapshot;

pub use annotations::MatchingAnnotation;
pub use backoff::{BackoffTracker, ExponentialBackoff, RetryPolicy};
pub use error::KubeLbError;
pub use ingress::IngressResource;
pub use mapper::{EndpointSource, ResolvedEndpoints};
pub use reconcile::{reconcile_object, DesiredState, ReconcileOutcome};
pub use snapshot::{InMemorySnapshotCache, SnapshotCache, SnapshotResource};

#[cfg(test)]
mod reconcile_test;
