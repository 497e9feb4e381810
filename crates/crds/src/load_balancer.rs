//! LoadBalancer CRD
//!
//! Lives in the management cluster, one per admitted tenant Service.
//! The namespace is the tenant cluster identity, the name is the
//! stringified UID of the originating Service.

use crate::common::{LoadBalancerEndpoints, LoadBalancerPort, LoadBalancerState, ServiceType};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Label holding the namespace of the tenant Service that created the LoadBalancer.
pub const LABEL_ORIGIN_NAMESPACE: &str = "kubelb.k8c.io/origin-ns";

/// Label holding the name of the tenant Service that created the LoadBalancer.
pub const LABEL_ORIGIN_NAME: &str = "kubelb.k8c.io/origin-name";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[kube(
    group = "kubelb.k8c.io",
    version = "v1alpha1",
    kind = "LoadBalancer",
    namespaced,
    status = "LoadBalancerStatus",
    shortname = "lb",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    /// Type of the originating Service (NodePort or LoadBalancer)
    #[serde(rename = "type", default)]
    pub type_: ServiceType,

    /// Ports exposed by the load balancer
    #[serde(default)]
    pub ports: Vec<LoadBalancerPort>,

    /// Backend endpoint groups traffic is forwarded to
    #[serde(default)]
    pub endpoints: Vec<LoadBalancerEndpoints>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerStatus {
    /// Ingress points assigned by the management cluster
    #[serde(default)]
    pub load_balancer: LoadBalancerState,
}

impl LoadBalancer {
    /// Ingress points currently reported in status, empty when status is unset.
    pub fn ingress(&self) -> &[crate::common::LoadBalancerIngress] {
        self.status
            .as_ref()
            .map(|status| status.load_balancer.ingress.as_slice())
            .unwrap_or_default()
    }
}
