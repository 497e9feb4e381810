//! Service reconciliation logic.
//!
//! One pass over a tenant Service:
//! 1. fetch it (gone means done)
//! 2. check admission
//! 3. resolve its endpoints
//! 4. run the finalizer lifecycle (cleanup on deletion, register otherwise)
//! 5. map and reconcile the management-cluster LoadBalancer
//! 6. copy the LoadBalancer ingress into the Service status

use crate::admission::AdmissionGate;
use crate::endpoints::EndpointResolver;
use crate::error::ControllerError;
use crate::finalizer::{self, FinalizerState};
use crate::status::StatusPropagator;
use crds::LoadBalancer;
use k8s_openapi::api::core::v1::Service;
use kube::ResourceExt;
use kubelb::mapper::map_load_balancer;
use kubelb::{reconcile_object, ReconcileOutcome};
use kubelb_store::ObjectStore;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Reconciler for tenant Services.
pub struct Reconciler {
    services: Arc<dyn ObjectStore<Service>>,
    load_balancers: Arc<dyn ObjectStore<LoadBalancer>>,
    cluster_name: String,
    gate: AdmissionGate,
    resolver: EndpointResolver,
    status: StatusPropagator,
}

impl Reconciler {
    /// Creates a reconciler writing LoadBalancers into `cluster_name`.
    pub fn new(
        services: Arc<dyn ObjectStore<Service>>,
        load_balancers: Arc<dyn ObjectStore<LoadBalancer>>,
        cluster_name: String,
        gate: AdmissionGate,
        resolver: EndpointResolver,
        status: StatusPropagator,
    ) -> Self {
        Self {
            services,
            load_balancers,
            cluster_name,
            gate,
            resolver,
            status,
        }
    }

    /// Reconciles the Service `namespace/name`.
    pub async fn reconcile_service(&self, namespace: &str, name: &str) -> Result<(), ControllerError> {
        debug!("Reconciling Service {}/{}", namespace, name);

        let mut service = match self.services.get(namespace, name).await {
            Ok(service) => service,
            Err(e) if e.is_not_found() => {
                debug!("Service {}/{} not found", namespace, name);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if !self.gate.admits(&service) {
            trace!("Service {}/{} not admitted", namespace, name);
            return Ok(());
        }

        let endpoints = self.resolver.resolve(&service);
        trace!("Proceeding with endpoints {:?}", endpoints.addresses);

        if service.metadata.deletion_timestamp.is_some() {
            return self.cleanup(service).await;
        }

        if finalizer::register(&mut service) == FinalizerState::Registering {
            debug!("Setting finalizer on Service {}/{}", namespace, name);
            service = self.services.update(&service).await?;
        }

        let desired = map_load_balancer(&service, &endpoints, &self.cluster_name)?;
        trace!("Desired LoadBalancer {:?}", desired);

        let lb = match reconcile_object(self.load_balancers.as_ref(), &desired).await? {
            ReconcileOutcome::Unchanged(lb) => {
                debug!("LoadBalancer {}/{} is in desired state", self.cluster_name, lb_name(&lb));
                lb
            }
            outcome => outcome.into_inner(),
        };

        self.status
            .propagate(self.services.as_ref(), &service, &lb)
            .await?;

        Ok(())
    }

    /// Deletes the downstream LoadBalancer, then releases the finalizer.
    async fn cleanup(&self, mut service: Service) -> Result<(), ControllerError> {
        if FinalizerState::of(&service) != FinalizerState::Deleting {
            return Ok(());
        }

        let lb_name = service.metadata.uid.clone().ok_or_else(|| {
            ControllerError::KubeLb(kubelb::KubeLbError::MissingField(
                "service metadata.uid".to_string(),
            ))
        })?;
        let key = format!("{}/{}", self.cluster_name, lb_name);

        match self.load_balancers.delete(&self.cluster_name, &lb_name).await {
            Ok(()) => info!("Deleted LoadBalancer {}", key),
            Err(e) if e.is_not_found() => debug!("LoadBalancer {} already gone", key),
            Err(e) => return Err(ControllerError::Cleanup(key, e)),
        }

        info!(
            "Removing LoadBalancer finalizer from Service {}/{}",
            service.namespace().unwrap_or_default(),
            service.name_any()
        );
        finalizer::release(&mut service);
        self.services.update(&service).await?;
        debug!("Removed finalizer");

        Ok(())
    }
}

fn lb_name(lb: &LoadBalancer) -> &str {
    lb.metadata.name.as_deref().unwrap_or("<unknown>")
}
