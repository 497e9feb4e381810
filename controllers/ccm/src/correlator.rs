//! Cross-cluster event correlation
//!
//! Routes a management-cluster LoadBalancer event back to the tenant Service
//! that owns it, using the origin labels set when the LoadBalancer was created.

use crds::{LoadBalancer, ServiceType, LABEL_ORIGIN_NAME, LABEL_ORIGIN_NAMESPACE};
use k8s_openapi::api::core::v1::Service;
use kube::ResourceExt;
use kube_runtime::reflector::ObjectRef;
use tracing::error;

#[derive(Debug, Clone)]
pub struct CrossClusterCorrelator {
    cluster_name: String,
}

impl CrossClusterCorrelator {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
        }
    }

    /// Service key to reconcile for a LoadBalancer event, `None` to drop it.
    pub fn correlate(&self, lb: &LoadBalancer) -> Option<ObjectRef<Service>> {
        // Other tenants share the management cluster
        if lb.metadata.namespace.as_deref() != Some(self.cluster_name.as_str()) {
            return None;
        }
        // NodePort resources carry no status worth propagating
        if lb.spec.type_ != ServiceType::LoadBalancer {
            return None;
        }

        let namespace = Self::origin_label(lb, LABEL_ORIGIN_NAMESPACE)?;
        let name = Self::origin_label(lb, LABEL_ORIGIN_NAME)?;
        Some(ObjectRef::new(name).within(namespace))
    }

    fn origin_label<'a>(lb: &'a LoadBalancer, label: &str) -> Option<&'a str> {
        match lb.labels().get(label).map(String::as_str) {
            Some(value) if !value.is_empty() => Some(value),
            _ => {
                error!(
                    "Failed to queue Service for LoadBalancer {}: required label {:?} not found",
                    lb.name_any(),
                    label
                );
                None
            }
        }
    }
}
