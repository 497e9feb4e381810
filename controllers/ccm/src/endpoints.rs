//! Endpoint resolution
//!
//! A LoadBalancer Service outside cloud-controller mode already sits behind
//! some other load balancer, so its own ingress points are the backends.
//! Everywhere else the configured node addresses are.

use crds::ServiceType;
use k8s_openapi::api::core::v1::Service;
use kubelb::mapper::{service_ingress, service_type};
use kubelb::{EndpointSource, ResolvedEndpoints};

#[derive(Debug, Clone)]
pub struct EndpointResolver {
    cloud_controller: bool,
    cluster_endpoints: Vec<String>,
}

impl EndpointResolver {
    /// Resolver falling back to `cluster_endpoints` for node backends.
    pub fn new(cloud_controller: bool, cluster_endpoints: Vec<String>) -> Self {
        Self {
            cloud_controller,
            cluster_endpoints,
        }
    }

    /// Ordered backend addresses for `service`.
    pub fn resolve(&self, service: &Service) -> ResolvedEndpoints {
        if service_type(service) == ServiceType::LoadBalancer && !self.cloud_controller {
            // An ingress point with neither IP nor hostname cannot be a backend
            let addresses = service_ingress(service)
                .into_iter()
                .filter_map(|point| match point.ip {
                    Some(ip) if !ip.is_empty() => Some(ip),
                    _ => point.hostname.filter(|hostname| !hostname.is_empty()),
                })
                .collect();
            return ResolvedEndpoints {
                addresses,
                source: EndpointSource::ExistingLoadBalancer,
            };
        }

        ResolvedEndpoints {
            addresses: self.cluster_endpoints.clone(),
            source: EndpointSource::Nodes,
        }
    }
}
