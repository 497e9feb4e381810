//! HTTPLoadBalancer CRD
//!
//! Legacy layer-7 ingress resource. Routing rules select a backend port by
//! host and path; the set of backend ports becomes the generated Service's
//! ports and `subsets` become its Endpoints.

use crate::common::{LoadBalancerEndpoints, LoadBalancerState};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[kube(
    group = "kubelb.k8c.io",
    version = "v1alpha1",
    kind = "HTTPLoadBalancer",
    namespaced,
    status = "HTTPLoadBalancerStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct HTTPLoadBalancerSpec {
    /// Host and path based routing rules
    #[serde(default)]
    pub rules: Vec<IngressRule>,

    /// Endpoint subsets copied into the generated Endpoints
    #[serde(default)]
    pub subsets: Vec<LoadBalancerEndpoints>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    /// Host the rule applies to, all hosts when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// HTTP paths routed by this rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HTTPIngressRuleValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HTTPIngressRuleValue {
    #[serde(default)]
    pub paths: Vec<HTTPIngressPath>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HTTPIngressPath {
    /// Path prefix, `/` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Backend receiving matching requests
    pub backend: IngressBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct IngressBackend {
    /// Name of the backend service
    pub service_name: String,

    /// Port of the backend service
    pub service_port: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HTTPLoadBalancerStatus {
    #[serde(default)]
    pub load_balancer: LoadBalancerState,
}

impl HTTPLoadBalancerSpec {
    /// Distinct backend ports referenced by the rules, ascending.
    pub fn backend_ports(&self) -> Vec<i32> {
        let mut ports: Vec<i32> = self
            .rules
            .iter()
            .filter_map(|rule| rule.http.as_ref())
            .flat_map(|http| http.paths.iter().map(|path| path.backend.service_port))
            .collect();
        ports.sort_unstable();
        ports.dedup();
        ports
    }
}
