//! Legacy ingress resources
//!
//! `TCPLoadBalancer`, `HTTPLoadBalancer` and `GlobalLoadBalancer` all expand
//! into one Service plus one Endpoints object. [`IngressResource`] puts the
//! three kinds behind one variant so the mapper and the manager never switch
//! on the concrete type.

use crds::{GlobalLoadBalancer, HTTPLoadBalancer, LoadBalancerEndpoints, LoadBalancerPort, TCPLoadBalancer};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::Resource;

const HTTP_PROTOCOL: &str = "TCP";

/// One of the legacy ingress kinds.
#[derive(Debug, Clone)]
pub enum IngressResource {
    Tcp(TCPLoadBalancer),
    Http(HTTPLoadBalancer),
    Global(GlobalLoadBalancer),
}

impl IngressResource {
    /// Kind name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tcp(_) => "TCPLoadBalancer",
            Self::Http(_) => "HTTPLoadBalancer",
            Self::Global(_) => "GlobalLoadBalancer",
        }
    }

    /// Metadata of the wrapped resource.
    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Tcp(lb) => &lb.metadata,
            Self::Http(lb) => &lb.metadata,
            Self::Global(lb) => &lb.metadata,
        }
    }

    /// Ports the generated Service exposes.
    ///
    /// HTTP resources expose one TCP port per distinct backend port named
    /// `http-<port>`; the layer-4 kinds carry their ports verbatim.
    pub fn ports(&self) -> Vec<LoadBalancerPort> {
        match self {
            Self::Tcp(lb) => lb.spec.ports.clone(),
            Self::Global(lb) => lb.spec.ports.clone(),
            Self::Http(lb) => lb
                .spec
                .backend_ports()
                .into_iter()
                .map(|port| LoadBalancerPort {
                    name: Some(format!("http-{port}")),
                    port,
                    protocol: Some(HTTP_PROTOCOL.to_string()),
                })
                .collect(),
        }
    }

    /// Subsets the generated Endpoints carry.
    pub fn subsets(&self) -> &[LoadBalancerEndpoints] {
        match self {
            Self::Tcp(lb) => &lb.spec.subsets,
            Self::Http(lb) => &lb.spec.subsets,
            Self::Global(lb) => &lb.spec.subsets,
        }
    }

    /// Controller owner reference pointing at this resource, `None` when it
    /// has no name or UID yet.
    pub fn owner_reference(&self) -> Option<OwnerReference> {
        match self {
            Self::Tcp(lb) => lb.controller_owner_ref(&()),
            Self::Http(lb) => lb.controller_owner_ref(&()),
            Self::Global(lb) => lb.controller_owner_ref(&()),
        }
    }
}

impl From<TCPLoadBalancer> for IngressResource {
    fn from(lb: TCPLoadBalancer) -> Self {
        Self::Tcp(lb)
    }
}

impl From<HTTPLoadBalancer> for IngressResource {
    fn from(lb: HTTPLoadBalancer) -> Self {
        Self::Http(lb)
    }
}

impl From<GlobalLoadBalancer> for IngressResource {
    fn from(lb: GlobalLoadBalancer) -> Self {
        Self::Global(lb)
    }
}
