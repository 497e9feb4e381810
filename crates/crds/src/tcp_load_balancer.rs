//! TCPLoadBalancer CRD
//!
//! Legacy layer-4 ingress resource. Carries ports and endpoint subsets
//! directly and is expanded by the manager into a Service/Endpoints pair.

use crate::common::{LoadBalancerEndpoints, LoadBalancerPort, LoadBalancerState};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[kube(
    group = "kubelb.k8c.io",
    version = "v1alpha1",
    kind = "TCPLoadBalancer",
    namespaced,
    status = "TCPLoadBalancerStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct TCPLoadBalancerSpec {
    /// Ports exposed by the generated Service
    #[serde(default)]
    pub ports: Vec<LoadBalancerPort>,

    /// Endpoint subsets copied into the generated Endpoints
    #[serde(default)]
    pub subsets: Vec<LoadBalancerEndpoints>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TCPLoadBalancerStatus {
    #[serde(default)]
    pub load_balancer: LoadBalancerState,
}
