//! Test utilities for unit testing the manager

use crate::reconciler::LegacyReconciler;
use crds::{
    EndpointAddress, EndpointPort, GlobalLoadBalancer, GlobalLoadBalancerSpec, LoadBalancer,
    LoadBalancerEndpoints, LoadBalancerPort, LoadBalancerSpec, ServiceType, TCPLoadBalancer,
    TCPLoadBalancerSpec,
};
use k8s_openapi::api::core::v1::{Endpoints, Service};
use kubelb_store::MockStore;
use std::sync::Arc;

fn ports(port: i32) -> Vec<LoadBalancerPort> {
    vec![LoadBalancerPort {
        name: Some("tcp".to_string()),
        port,
        protocol: Some("TCP".to_string()),
    }]
}

fn subsets(ip: &str) -> Vec<LoadBalancerEndpoints> {
    vec![LoadBalancerEndpoints {
        addresses: vec![EndpointAddress {
            ip: ip.to_string(),
            hostname: None,
        }],
        ports: vec![EndpointPort {
            name: Some("tcp".to_string()),
            port: 31000,
            protocol: Some("TCP".to_string()),
        }],
    }]
}

/// Helper to create a test TCPLoadBalancer with one port and one backend
pub fn create_test_tcp_load_balancer(namespace: &str, name: &str, port: i32, ip: &str) -> TCPLoadBalancer {
    let mut lb = TCPLoadBalancer::new(
        name,
        TCPLoadBalancerSpec {
            ports: ports(port),
            subsets: subsets(ip),
        },
    );
    lb.metadata.namespace = Some(namespace.to_string());
    lb.metadata.uid = Some(format!("{name}-uid"));
    lb
}

/// Helper to create a test GlobalLoadBalancer with one port and one backend
pub fn create_test_global_load_balancer(namespace: &str, name: &str, port: i32, ip: &str) -> GlobalLoadBalancer {
    let mut lb = GlobalLoadBalancer::new(
        name,
        GlobalLoadBalancerSpec {
            ports: ports(port),
            subsets: subsets(ip),
        },
    );
    lb.metadata.namespace = Some(namespace.to_string());
    lb.metadata.uid = Some(format!("{name}-uid"));
    lb
}

/// Helper to create a test LoadBalancer exposing `port`
pub fn create_test_load_balancer(namespace: &str, name: &str, port: i32) -> LoadBalancer {
    let mut lb = LoadBalancer::new(
        name,
        LoadBalancerSpec {
            type_: ServiceType::LoadBalancer,
            ports: vec![LoadBalancerPort {
                name: None,
                port,
                protocol: Some("TCP".to_string()),
            }],
            endpoints: vec![],
        },
    );
    lb.metadata.namespace = Some(namespace.to_string());
    lb
}

/// Reconciler under test with handles on its stores
pub struct TestReconciler {
    pub reconciler: LegacyReconciler,
    pub services: MockStore<Service>,
    pub endpoints: MockStore<Endpoints>,
}

/// Helper to create a legacy reconciler backed by mock stores sharing one journal
pub fn create_test_reconciler() -> TestReconciler {
    let services = MockStore::<Service>::new();
    let endpoints = MockStore::<Endpoints>::sharing_journal(&services);
    TestReconciler {
        reconciler: LegacyReconciler::new(Arc::new(services.clone()), Arc::new(endpoints.clone())),
        services,
        endpoints,
    }
}
