//! Desired-state mapping
//!
//! Forward: tenant Service + resolved endpoints → management `LoadBalancer`.
//! Inverse (legacy path): ingress resource → generated Service + Endpoints.
//!
//! Mapping is pure and deterministic: identical inputs always produce an
//! identical spec, which the reconcile step relies on to stay idempotent.

use crate::error::KubeLbError;
use crate::ingress::IngressResource;
use crds::{
    EndpointAddress, EndpointPort, LoadBalancer, LoadBalancerEndpoints, LoadBalancerIngress,
    LoadBalancerPort, LoadBalancerSpec, ServiceType, LABEL_ORIGIN_NAME, LABEL_ORIGIN_NAMESPACE,
};
use k8s_openapi::api::core::v1::{
    EndpointAddress as CoreEndpointAddress, EndpointPort as CoreEndpointPort, EndpointSubset,
    Endpoints, LoadBalancerIngress as CoreLoadBalancerIngress, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Protocol the API server defaults unset port protocols to.
pub const DEFAULT_PROTOCOL: &str = "TCP";

/// Where resolved endpoint addresses come from; decides which port the
/// backends listen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSource {
    /// Tenant cluster nodes, reached on each port's nodePort
    Nodes,
    /// An existing external load balancer, reached on the Service port
    ExistingLoadBalancer,
}

/// Ordered backend addresses for one Service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoints {
    /// Backend IPs or hostnames
    pub addresses: Vec<String>,
    /// Whether the addresses are nodes or an existing load balancer
    pub source: EndpointSource,
}

/// Type of a Service, `ClusterIP` when unset.
pub fn service_type(service: &Service) -> ServiceType {
    ServiceType::parse(service.spec.as_ref().and_then(|spec| spec.type_.as_deref()))
}

fn service_ports(service: &Service) -> &[ServicePort] {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_deref())
        .unwrap_or_default()
}

/// Current ingress points in a Service's status, normalized to the CRD type.
pub fn service_ingress(service: &Service) -> Vec<LoadBalancerIngress> {
    service
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .map(|ingress| {
            ingress
                .iter()
                .map(|point| LoadBalancerIngress {
                    ip: point.ip.clone(),
                    hostname: point.hostname.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Converts CRD ingress points into Service status ingress entries.
pub fn core_ingress(ingress: &[LoadBalancerIngress]) -> Vec<CoreLoadBalancerIngress> {
    ingress
        .iter()
        .map(|point| CoreLoadBalancerIngress {
            ip: point.ip.clone(),
            hostname: point.hostname.clone(),
            ..Default::default()
        })
        .collect()
}

/// Maps a tenant Service onto the LoadBalancer that represents it in the
/// management cluster.
///
/// Endpoint grouping: a single group holding every address in resolver
/// order, with one port per Service port. Node endpoints use the nodePort,
/// endpoints of an existing load balancer use the Service port.
pub fn map_load_balancer(
    service: &Service,
    endpoints: &ResolvedEndpoints,
    cluster_name: &str,
) -> Result<LoadBalancer, KubeLbError> {
    let uid = service
        .metadata
        .uid
        .clone()
        .ok_or_else(|| KubeLbError::MissingField("service metadata.uid".to_string()))?;
    let name = service
        .metadata
        .name
        .clone()
        .ok_or_else(|| KubeLbError::MissingField("service metadata.name".to_string()))?;
    let namespace = service
        .metadata
        .namespace
        .clone()
        .ok_or_else(|| KubeLbError::MissingField("service metadata.namespace".to_string()))?;

    let ports = service_ports(service);
    let lb_ports = ports
        .iter()
        .map(|port| LoadBalancerPort {
            name: port.name.clone(),
            port: port.port,
            protocol: port.protocol.clone(),
        })
        .collect();
    let endpoint_ports = ports
        .iter()
        .map(|port| EndpointPort {
            name: port.name.clone(),
            port: match endpoints.source {
                EndpointSource::Nodes => port.node_port.unwrap_or(port.port),
                EndpointSource::ExistingLoadBalancer => port.port,
            },
            protocol: port.protocol.clone(),
        })
        .collect();
    let addresses = endpoints
        .addresses
        .iter()
        .map(|address| EndpointAddress {
            ip: address.clone(),
            hostname: None,
        })
        .collect();

    let labels = BTreeMap::from([
        (LABEL_ORIGIN_NAMESPACE.to_string(), namespace),
        (LABEL_ORIGIN_NAME.to_string(), name),
    ]);

    Ok(LoadBalancer {
        metadata: ObjectMeta {
            name: Some(uid),
            namespace: Some(cluster_name.to_string()),
            labels: Some(labels),
            annotations: service.metadata.annotations.clone(),
            ..Default::default()
        },
        spec: LoadBalancerSpec {
            type_: service_type(service),
            ports: lb_ports,
            endpoints: vec![LoadBalancerEndpoints {
                addresses,
                ports: endpoint_ports,
            }],
        },
        status: None,
    })
}

/// True when `actual` already carries the spec and annotations of `desired`.
///
/// Status, resourceVersion and other metadata belong to other writers and
/// are not compared. Missing annotations equal empty annotations.
pub fn load_balancer_is_desired_state(actual: &LoadBalancer, desired: &LoadBalancer) -> bool {
    actual.spec == desired.spec
        && actual.metadata.annotations.clone().unwrap_or_default()
            == desired.metadata.annotations.clone().unwrap_or_default()
}

fn generated_metadata(resource: &IngressResource) -> Result<ObjectMeta, KubeLbError> {
    let meta = resource.metadata();
    let owner = resource.owner_reference().ok_or_else(|| {
        KubeLbError::MissingField(format!("{} metadata.name/uid", resource.kind()))
    })?;

    Ok(ObjectMeta {
        name: meta.name.clone(),
        namespace: meta.namespace.clone(),
        owner_references: Some(vec![owner]),
        ..Default::default()
    })
}

/// Generated Service for a legacy ingress resource, type LoadBalancer,
/// owned by the resource.
pub fn map_service(resource: &IngressResource) -> Result<Service, KubeLbError> {
    let ports = resource
        .ports()
        .into_iter()
        .map(|port| ServicePort {
            name: port.name,
            port: port.port,
            protocol: port.protocol,
            ..Default::default()
        })
        .collect();

    Ok(Service {
        metadata: generated_metadata(resource)?,
        spec: Some(ServiceSpec {
            ports: Some(ports),
            type_: Some(ServiceType::LoadBalancer.as_str().to_string()),
            ..Default::default()
        }),
        status: None,
    })
}

/// Generated Endpoints for a legacy ingress resource, owned by the resource.
pub fn map_endpoints(resource: &IngressResource) -> Result<Endpoints, KubeLbError> {
    let subsets = resource
        .subsets()
        .iter()
        .map(|subset| EndpointSubset {
            addresses: Some(
                subset
                    .addresses
                    .iter()
                    .map(|address| CoreEndpointAddress {
                        ip: address.ip.clone(),
                        hostname: address.hostname.clone(),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ports: Some(
                subset
                    .ports
                    .iter()
                    .map(|port| CoreEndpointPort {
                        name: port.name.clone(),
                        port: port.port,
                        protocol: port.protocol.clone(),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        })
        .collect();

    Ok(Endpoints {
        metadata: generated_metadata(resource)?,
        subsets: Some(subsets),
    })
}
