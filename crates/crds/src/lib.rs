//! KubeLB CRD Definitions
//!
//! Kubernetes Custom Resource Definitions shared by the KubeLB
//! cloud-controller (tenant side) and manager (management side).

pub mod common;
pub mod load_balancer;
pub mod tcp_load_balancer;
pub mod http_load_balancer;
pub mod global_load_balancer;

pub use common::*;
pub use load_balancer::*;
pub use tcp_load_balancer::*;
pub use http_load_balancer::*;
pub use global_load_balancer::*;

/// API group of every KubeLB custom resource.
pub const API_GROUP: &str = "kubelb.k8c.io";
