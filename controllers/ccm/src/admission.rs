//! Service admission
//!
//! Decides whether a Service is managed at all. Only NodePort and
//! LoadBalancer Services are candidates; they must carry the service-class
//! annotation, except LoadBalancer Services in cloud-controller mode, where
//! this controller is the cluster's only load balancer provider.

use crds::ServiceType;
use k8s_openapi::api::core::v1::Service;
use kubelb::mapper::service_type;
use kubelb::MatchingAnnotation;

#[derive(Debug, Clone)]
pub struct AdmissionGate {
    annotation: MatchingAnnotation,
    cloud_controller: bool,
}

impl AdmissionGate {
    /// Gate admitting Services that carry `annotation`, or any LoadBalancer Service in cloud-controller mode.
    pub fn new(annotation: MatchingAnnotation, cloud_controller: bool) -> Self {
        Self {
            annotation,
            cloud_controller,
        }
    }

    /// True when `service` is in scope.
    pub fn admits(&self, service: &Service) -> bool {
        match service_type(service) {
            ServiceType::LoadBalancer => {
                self.cloud_controller
                    || self.annotation.matches(service.metadata.annotations.as_ref())
            }
            ServiceType::NodePort => self.annotation.matches(service.metadata.annotations.as_ref()),
            ServiceType::ClusterIP | ServiceType::ExternalName => false,
        }
    }
}
