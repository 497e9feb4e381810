//! Types shared by the LoadBalancer and legacy ingress CRDs
//!
//! These mirror the subset of `core/v1` Service/Endpoints fields KubeLB
//! carries across clusters. They are kept as separate types (rather than
//! embedding `k8s_openapi` structs) so the CRD schema stays minimal and
//! structural equality only covers fields KubeLB owns.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kubernetes Service type, as far as KubeLB cares about it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Default)]
pub enum ServiceType {
    /// Cluster-internal virtual IP (API server default when unset)
    #[default]
    ClusterIP,

    /// Exposed on every node's port
    NodePort,

    /// Exposed through an external load balancer
    LoadBalancer,

    /// DNS alias, never load balanced
    ExternalName,
}

impl ServiceType {
    /// Parses the `spec.type` string of a Service. Unset means `ClusterIP`,
    /// matching the API server default; unknown values are treated the same.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("NodePort") => Self::NodePort,
            Some("LoadBalancer") => Self::LoadBalancer,
            Some("ExternalName") => Self::ExternalName,
            _ => Self::ClusterIP,
        }
    }

    /// The wire name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClusterIP => "ClusterIP",
            Self::NodePort => "NodePort",
            Self::LoadBalancer => "LoadBalancer",
            Self::ExternalName => "ExternalName",
        }
    }
}

/// A port exposed by the load balancer.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerPort {
    /// Port name, required when more than one port is defined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Port number exposed by the load balancer
    pub port: i32,

    /// IP protocol (TCP, UDP or SCTP)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// A single backend address.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EndpointAddress {
    /// IP address (or resolvable host name) of the backend
    pub ip: String,

    /// Optional host name of the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

/// A port served by every address of an endpoint group.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EndpointPort {
    /// Must match the name of the corresponding `LoadBalancerPort`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Backend port number
    pub port: i32,

    /// IP protocol (TCP, UDP or SCTP)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// A group of addresses sharing the same set of ports.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerEndpoints {
    /// Backend addresses
    #[serde(default)]
    pub addresses: Vec<EndpointAddress>,

    /// Ports available on every address
    #[serde(default)]
    pub ports: Vec<EndpointPort>,
}

/// An ingress point of a load balancer: an IP or a host name.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerIngress {
    /// IP address of the ingress point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// DNS name of the ingress point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

/// Current status of a load balancer.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerState {
    /// Ingress points, in the order the data plane reports them
    #[serde(default)]
    pub ingress: Vec<LoadBalancerIngress>,
}
