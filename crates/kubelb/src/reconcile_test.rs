//! Unit tests for reconcile module

#[cfg(test)]
mod tests {
    use crate::reconcile::*;
    use crds::*;
    use k8s_openapi::api::core::v1::{
        EndpointAddress as CoreEndpointAddress, EndpointPort as CoreEndpointPort, EndpointSubset,
        Endpoints, Service, ServicePort, ServiceSpec,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
    use kubelb_store::{Failure, MockStore, Operation};
    use std::collections::BTreeMap;

    fn load_balancer(port: i32) -> LoadBalancer {
        let mut lb = LoadBalancer::new(
            "abc-123",
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
        lb.metadata.namespace = Some("tenant-a".to_string());
        lb
    }

    fn service(ports: Vec<ServicePort>) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some("echo".to_string()),
                namespace: Some("tenant-a".to_string()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                type_: Some("LoadBalancer".to_string()),
                ports: Some(ports),
                ..Default::default()
            }),
            status: None,
        }
    }

    fn port(port: i32) -> ServicePort {
        ServicePort {
            port,
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_absent_object_is_created() {
        let store = MockStore::<LoadBalancer>::new();

        let outcome = reconcile_object(&store, &load_balancer(80)).await.unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Created(_)));
        assert!(store.object("tenant-a", "abc-123").is_some());
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_desired_object_issues_no_write() {
        let store = MockStore::<LoadBalancer>::new();
        store.insert(load_balancer(80));

        let outcome = reconcile_object(&store, &load_balancer(80)).await.unwrap();

        assert!(!outcome.wrote());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_drifted_object_is_merged_and_updated() {
        let store = MockStore::<LoadBalancer>::new();
        let mut existing = load_balancer(80);
        existing.metadata.uid = Some("server-uid".to_string());
        existing.metadata.labels = Some(BTreeMap::from([("owner".to_string(), "someone".to_string())]));
        store.insert(existing);

        let mut desired = load_balancer(443);
        desired.metadata.annotations =
            Some(BTreeMap::from([("team".to_string(), "edge".to_string())]));
        let outcome = reconcile_object(&store, &desired).await.unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Updated(_)));
        let stored = store.object("tenant-a", "abc-123").unwrap();
        assert_eq!(stored.spec.ports[0].port, 443);
        assert_eq!(stored.metadata.annotations, desired.metadata.annotations);
        assert_eq!(stored.metadata.uid.as_deref(), Some("server-uid"));
        assert_eq!(
            stored.metadata.labels.unwrap().get("owner").map(String::as_str),
            Some("someone")
        );
    }

    #[tokio::test]
    async fn test_update_conflict_is_surfaced() {
        let store = MockStore::<LoadBalancer>::new();
        store.insert(load_balancer(80));
        store.fail_next(Operation::Update, Failure::Conflict);

        let err = reconcile_object(&store, &load_balancer(443)).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(store.object("tenant-a", "abc-123").unwrap().spec.ports[0].port, 80);
    }

    #[tokio::test]
    async fn test_transient_get_error_is_surfaced() {
        let store = MockStore::<LoadBalancer>::new();
        store.fail_next(Operation::Get, Failure::Unavailable);

        assert!(reconcile_object(&store, &load_balancer(80)).await.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_service_defaulted_protocol_is_not_drift() {
        let store = MockStore::<Service>::new();
        let mut existing = service(vec![ServicePort {
            port: 7000,
            protocol: None,
            node_port: Some(31000),
            ..Default::default()
        }]);
        existing.metadata.uid = Some("svc-uid".to_string());
        store.insert(existing);

        let outcome = reconcile_object(&store, &service(vec![port(7000)])).await.unwrap();

        assert!(!outcome.wrote());
    }

    #[tokio::test]
    async fn test_service_update_keeps_allocated_node_ports() {
        let store = MockStore::<Service>::new();
        store.insert(service(vec![ServicePort {
            port: 7000,
            protocol: Some("TCP".to_string()),
            node_port: Some(31000),
            target_port: Some(IntOrString::Int(7000)),
            ..Default::default()
        }]));

        reconcile_object(&store, &service(vec![port(7000), port(7001)]))
            .await
            .unwrap();

        let stored = store.object("tenant-a", "echo").unwrap();
        let spec = stored.spec.unwrap();
        let ports = spec.ports.unwrap();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].node_port, Some(31000));
        assert_eq!(ports[0].target_port, Some(IntOrString::Int(7000)));
        assert_eq!(ports[1].node_port, None);
        assert_eq!(spec.type_.as_deref(), Some("LoadBalancer"));
    }

    fn endpoints(ip: &str, protocol: Option<&str>) -> Endpoints {
        Endpoints {
            metadata: ObjectMeta {
                name: Some("echo".to_string()),
                namespace: Some("tenant-a".to_string()),
                ..Default::default()
            },
            subsets: Some(vec![EndpointSubset {
                addresses: Some(vec![CoreEndpointAddress {
                    ip: ip.to_string(),
                    ..Default::default()
                }]),
                ports: Some(vec![CoreEndpointPort {
                    port: 31000,
                    protocol: protocol.map(str::to_string),
                    ..Default::default()
                }]),
                ..Default::default()
            }]),
        }
    }

    #[tokio::test]
    async fn test_endpoints_subsets_reconciled() {
        let store = MockStore::<Endpoints>::new();
        store.insert(endpoints("10.1.0.5", Some("TCP")));

        let unchanged = reconcile_object(&store, &endpoints("10.1.0.5", None)).await.unwrap();
        assert!(!unchanged.wrote());

        let updated = reconcile_object(&store, &endpoints("10.1.0.6", Some("TCP")))
            .await
            .unwrap();
        assert!(matches!(updated, ReconcileOutcome::Updated(_)));
        let stored = store.object("tenant-a", "echo").unwrap();
        assert_eq!(stored.subsets.unwrap()[0].addresses.as_ref().unwrap()[0].ip, "10.1.0.6");
    }
}
