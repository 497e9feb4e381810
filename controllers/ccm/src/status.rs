//! Status propagation
//!
//! Copies the ingress points of a management-cluster LoadBalancer into the
//! status of its tenant Service. Conflicts are retried by re-fetching the
//! Service, up to the configured [`RetryPolicy`].

use crate::error::ControllerError;
use crds::{LoadBalancer, ServiceType};
use k8s_openapi::api::core::v1::{LoadBalancerStatus, Service, ServiceStatus};
use kubelb::mapper::{core_ingress, service_ingress, service_type};
use kubelb::RetryPolicy;
use kubelb_store::{object_key, ObjectStore};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
/// Mirrors LoadBalancer ingress into tenant Service status.
pub struct StatusPropagator {
    policy: RetryPolicy,
}

impl StatusPropagator {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// True when the Service status already mirrors `lb`, or does not need to.
    pub fn in_sync(service: &Service, lb: &LoadBalancer) -> bool {
        service_type(service) != ServiceType::LoadBalancer || service_ingress(service) == lb.ingress()
    }

    /// Writes the ingress of `lb` into the status of `service`.
    ///
    /// Returns whether a status write happened.
    pub async fn propagate(
        &self,
        services: &dyn ObjectStore<Service>,
        service: &Service,
        lb: &LoadBalancer,
    ) -> Result<bool, ControllerError> {
        if Self::in_sync(service, lb) {
            debug!("Service status is in desired state");
            return Ok(false);
        }

        let (namespace, name) = object_key(service)?;
        info!("Updating Service {}/{} status", namespace, name);

        let steps = self.policy.steps.max(1);
        let mut attempt = 1;
        loop {
            let result = match services.get(&namespace, &name).await {
                Ok(mut latest) => {
                    set_ingress(&mut latest, lb);
                    services.update_status(&latest).await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(_) => return Ok(true),
                Err(e) if e.is_conflict() && attempt < steps => {
                    warn!(
                        "Conflict updating Service {}/{} status (attempt {}/{}), retrying",
                        namespace, name, attempt, steps
                    );
                    attempt += 1;
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(e) => return Err(ControllerError::StatusUpdate(format!("{namespace}/{name}"), e)),
            }
        }
    }
}

fn set_ingress(service: &mut Service, lb: &LoadBalancer) {
    let ingress = lb.ingress();
    let status = service.status.get_or_insert_with(ServiceStatus::default);
    status.load_balancer = Some(LoadBalancerStatus {
        ingress: if ingress.is_empty() {
            None
        } else {
            Some(core_ingress(ingress))
        },
    });
}
