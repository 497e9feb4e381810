//! Legacy ingress reconciliation logic.
//!
//! Every TCP, HTTP and Global ingress resource owns one Service and one
//! Endpoints object of the same name. Both are driven with the generic
//! reconcile engine; a failure on the second write leaves the first in
//! place and the whole pass is retried on the next trigger.

use crate::error::ControllerError;
use k8s_openapi::api::core::v1::{Endpoints, Service};
use kubelb::mapper::{map_endpoints, map_service};
use kubelb::{reconcile_object, IngressResource};
use kubelb_store::ObjectStore;
use std::sync::Arc;
use tracing::{debug, error};

/// Reconciler for legacy ingress resources.
pub struct LegacyReconciler {
    services: Arc<dyn ObjectStore<Service>>,
    endpoints: Arc<dyn ObjectStore<Endpoints>>,
}

impl LegacyReconciler {
    pub fn new(
        services: Arc<dyn ObjectStore<Service>>,
        endpoints: Arc<dyn ObjectStore<Endpoints>>,
    ) -> Self {
        Self {
            services,
            endpoints,
        }
    }

    /// Reconciles the generated Service, then the generated Endpoints.
    pub async fn handle_l4(&self, resource: &IngressResource) -> Result<(), ControllerError> {
        let meta = resource.metadata();
        let name = meta.name.as_deref().unwrap_or("<unknown>");
        let namespace = meta.namespace.as_deref().unwrap_or("<unknown>");

        // Owner references hand the generated objects to garbage collection
        if meta.deletion_timestamp.is_some() {
            debug!("{} {}/{} is being deleted", resource.kind(), namespace, name);
            return Ok(());
        }

        let desired_service = map_service(resource)?;
        if let Err(e) = reconcile_object(self.services.as_ref(), &desired_service).await {
            error!("Unable to reconcile Service {}/{}: {}", namespace, name, e);
            return Err(e.into());
        }

        let desired_endpoints = map_endpoints(resource)?;
        if let Err(e) = reconcile_object(self.endpoints.as_ref(), &desired_endpoints).await {
            error!("Unable to reconcile Endpoints {}/{}: {}", namespace, name, e);
            return Err(e.into());
        }

        Ok(())
    }
}
