//! Test utilities for unit testing the cloud controller
//!
//! Builders for Services and LoadBalancers, plus a reconciler wired to
//! in-memory stores that share one write journal.

use crate::admission::AdmissionGate;
use crate::endpoints::EndpointResolver;
use crate::reconciler::Reconciler;
use crate::status::StatusPropagator;
use crds::{
    LoadBalancer, LoadBalancerIngress, LoadBalancerSpec, LoadBalancerState, LoadBalancerStatus,
    ServiceType, LABEL_ORIGIN_NAME, LABEL_ORIGIN_NAMESPACE,
};
use k8s_openapi::api::core::v1::{
    LoadBalancerIngress as CoreLoadBalancerIngress, LoadBalancerStatus as CoreLoadBalancerStatus,
    Service, ServicePort, ServiceSpec, ServiceStatus,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kubelb::{MatchingAnnotation, RetryPolicy};
use kubelb_store::MockStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const CLUSTER_NAME: &str = "tenant-a";

/// Helper to create a test Service with one TCP port 80 (nodePort 30080)
pub fn create_test_service(
    namespace: &str,
    name: &str,
    uid: &str,
    type_: &str,
    annotated: bool,
) -> Service {
    let annotations = annotated.then(|| {
        BTreeMap::from([(
            "kubernetes.io/service.class".to_string(),
            "kubelb".to_string(),
        )])
    });
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(uid.to_string()),
            annotations,
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some(type_.to_string()),
            ports: Some(vec![ServicePort {
                port: 80,
                protocol: Some("TCP".to_string()),
                node_port: Some(30080),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: None,
    }
}

/// Sets the Service status ingress from `(ip, hostname)` pairs
pub fn with_ingress(mut service: Service, points: &[(Option<&str>, Option<&str>)]) -> Service {
    service.status = Some(ServiceStatus {
        load_balancer: Some(CoreLoadBalancerStatus {
            ingress: Some(
                points
                    .iter()
                    .map(|(ip, hostname)| CoreLoadBalancerIngress {
                        ip: ip.map(str::to_string),
                        hostname: hostname.map(str::to_string),
                        ..Default::default()
                    })
                    .collect(),
            ),
        }),
        ..Default::default()
    });
    service
}

/// Marks the Service as being deleted
pub fn deleting(mut service: Service) -> Service {
    service.metadata.deletion_timestamp =
        Some(serde_json::from_value::<Time>(serde_json::json!("2024-01-01T00:00:00Z")).unwrap());
    service
}

/// Helper to create a test LoadBalancer with origin labels
pub fn create_test_load_balancer(
    namespace: &str,
    name: &str,
    type_: ServiceType,
    origin_namespace: &str,
    origin_name: &str,
) -> LoadBalancer {
    let mut lb = LoadBalancer::new(
        name,
        LoadBalancerSpec {
            type_,
            ..Default::default()
        },
    );
    lb.metadata.namespace = Some(namespace.to_string());
    lb.metadata.labels = Some(BTreeMap::from([
        (LABEL_ORIGIN_NAMESPACE.to_string(), origin_namespace.to_string()),
        (LABEL_ORIGIN_NAME.to_string(), origin_name.to_string()),
    ]));
    lb
}

/// Sets a single IP ingress point on the LoadBalancer status
pub fn with_lb_ingress(mut lb: LoadBalancer, ip: &str) -> LoadBalancer {
    lb.status = Some(LoadBalancerStatus {
        load_balancer: LoadBalancerState {
            ingress: vec![LoadBalancerIngress {
                ip: Some(ip.to_string()),
                hostname: None,
            }],
        },
    });
    lb
}

/// Reconciler under test with handles on its stores
pub struct TestReconciler {
    pub reconciler: Reconciler,
    pub services: MockStore<Service>,
    pub load_balancers: MockStore<LoadBalancer>,
}

/// Helper to create a reconciler backed by mock stores sharing one journal
pub fn create_test_reconciler(cloud_controller: bool, cluster_endpoints: &[&str]) -> TestReconciler {
    let services = MockStore::<Service>::new();
    let load_balancers = MockStore::<LoadBalancer>::sharing_journal(&services);
    let reconciler = Reconciler::new(
        Arc::new(services.clone()),
        Arc::new(load_balancers.clone()),
        CLUSTER_NAME.to_string(),
        AdmissionGate::new(MatchingAnnotation::service_class(), cloud_controller),
        EndpointResolver::new(
            cloud_controller,
            cluster_endpoints.iter().map(|e| e.to_string()).collect(),
        ),
        StatusPropagator::new(RetryPolicy {
            steps: 5,
            delay: Duration::from_millis(1),
        }),
    );
    TestReconciler {
        reconciler,
        services,
        load_balancers,
    }
}
