//! Generic fetch-compare-create/update
//!
//! [`reconcile_object`] drives one desired object into a store: create it
//! when absent, leave it alone when already in the desired state, otherwise
//! merge the mutable fields onto the fetched object and update. The fetched
//! object is never blind-replaced so server-assigned metadata and fields
//! owned by other writers survive.

use crate::mapper::{load_balancer_is_desired_state, DEFAULT_PROTOCOL};
use crds::LoadBalancer;
use k8s_openapi::api::core::v1::{EndpointSubset, Endpoints, Service, ServicePort, ServiceSpec};
use kube::Resource;
use kubelb_store::{object_key, ObjectStore, StoreError};
use tracing::{debug, info};

/// A kind the reconcile engine can drive.
pub trait DesiredState: Resource<DynamicType = ()> + Clone + Send + Sync + 'static {
    /// True when the fields this kind may mutate already match `desired`.
    fn is_desired_state(actual: &Self, desired: &Self) -> bool;

    /// Copies the mutable fields of `desired` onto `actual`.
    fn apply_desired(actual: &mut Self, desired: &Self);
}

/// What [`reconcile_object`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome<K> {
    Created(K),
    Updated(K),
    Unchanged(K),
}

impl<K> ReconcileOutcome<K> {
    /// The object as it now exists in the store.
    pub fn into_inner(self) -> K {
        match self {
            Self::Created(object) | Self::Updated(object) | Self::Unchanged(object) => object,
        }
    }

    /// True when a write was issued.
    pub fn wrote(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }
}

/// Drives `desired` into `store`.
///
/// A conflict on update is surfaced, the caller requeues.
pub async fn reconcile_object<K>(
    store: &dyn ObjectStore<K>,
    desired: &K,
) -> Result<ReconcileOutcome<K>, StoreError>
where
    K: DesiredState,
{
    let (namespace, name) = object_key(desired)?;
    let kind = K::kind(&());

    let mut actual = match store.get(&namespace, &name).await {
        Ok(actual) => actual,
        Err(e) if e.is_not_found() => {
            info!("Creating {} {}/{}", kind, namespace, name);
            let created = store.create(desired).await?;
            return Ok(ReconcileOutcome::Created(created));
        }
        Err(e) => return Err(e),
    };

    if K::is_desired_state(&actual, desired) {
        debug!("{} {}/{} already in desired state", kind, namespace, name);
        return Ok(ReconcileOutcome::Unchanged(actual));
    }

    K::apply_desired(&mut actual, desired);
    info!("Updating {} {}/{}", kind, namespace, name);
    let updated = store.update(&actual).await?;
    Ok(ReconcileOutcome::Updated(updated))
}

impl DesiredState for LoadBalancer {
    fn is_desired_state(actual: &Self, desired: &Self) -> bool {
        load_balancer_is_desired_state(actual, desired)
    }

    fn apply_desired(actual: &mut Self, desired: &Self) {
        actual.spec = desired.spec.clone();
        actual.metadata.annotations = desired.metadata.annotations.clone();
    }
}

/// Port identity as the mapper states it; protocol defaults to TCP like the
/// API server does.
fn port_projection(port: &ServicePort) -> (Option<&str>, i32, &str) {
    (
        port.name.as_deref(),
        port.port,
        port.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL),
    )
}

fn service_ports(service: &Service) -> &[ServicePort] {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_deref())
        .unwrap_or_default()
}

impl DesiredState for Service {
    fn is_desired_state(actual: &Self, desired: &Self) -> bool {
        let actual_ports = service_ports(actual);
        let desired_ports = service_ports(desired);
        actual_ports.len() == desired_ports.len()
            && actual_ports
                .iter()
                .zip(desired_ports)
                .all(|(a, d)| port_projection(a) == port_projection(d))
    }

    fn apply_desired(actual: &mut Self, desired: &Self) {
        let existing = service_ports(actual).to_vec();
        let ports = service_ports(desired)
            .iter()
            .map(|port| {
                let mut merged = port.clone();
                // Keep server-allocated values for ports that did not change.
                if let Some(current) = existing
                    .iter()
                    .find(|current| port_projection(current) == port_projection(port))
                {
                    merged.node_port = merged.node_port.or(current.node_port);
                    merged.target_port = merged.target_port.or_else(|| current.target_port.clone());
                }
                merged
            })
            .collect();

        actual.spec.get_or_insert_with(ServiceSpec::default).ports = Some(ports);
    }
}

fn normalized_subsets(endpoints: &Endpoints) -> Vec<EndpointSubset> {
    let mut subsets = endpoints.subsets.clone().unwrap_or_default();
    for subset in &mut subsets {
        for port in subset.ports.iter_mut().flatten() {
            port.protocol.get_or_insert_with(|| DEFAULT_PROTOCOL.to_string());
        }
        if subset.addresses.as_ref().is_some_and(Vec::is_empty) {
            subset.addresses = None;
        }
        if subset.ports.as_ref().is_some_and(Vec::is_empty) {
            subset.ports = None;
        }
    }
    subsets
}

impl DesiredState for Endpoints {
    fn is_desired_state(actual: &Self, desired: &Self) -> bool {
        normalized_subsets(actual) == normalized_subsets(desired)
    }

    fn apply_desired(actual: &mut Self, desired: &Self) {
        actual.subsets = desired.subsets.clone();
    }
}
