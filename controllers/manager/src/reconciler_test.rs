//! Unit tests for the legacy ingress reconciler

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use kubelb::IngressResource;
    use kubelb_store::{Failure, Operation};

    #[tokio::test]
    async fn test_service_and_endpoints_created_in_order() {
        let t = create_test_reconciler();
        let resource = IngressResource::from(create_test_tcp_load_balancer("tenant-a", "echo", 7000, "10.1.0.5"));

        t.reconciler.handle_l4(&resource).await.unwrap();

        let writes = t.services.writes();
        let kinds: Vec<_> = writes.iter().map(|w| (w.kind.as_str(), w.operation)).collect();
        assert_eq!(
            kinds,
            vec![("Service", Operation::Create), ("Endpoints", Operation::Create)]
        );

        let service = t.services.object("tenant-a", "echo").unwrap();
        let spec = service.spec.unwrap();
        assert_eq!(spec.type_.as_deref(), Some("LoadBalancer"));
        assert_eq!(spec.ports.unwrap()[0].port, 7000);
        let owner = &service.metadata.owner_references.unwrap()[0];
        assert_eq!(owner.kind, "TCPLoadBalancer");
        assert_eq!(owner.name, "echo");

        let endpoints = t.endpoints.object("tenant-a", "echo").unwrap();
        assert_eq!(endpoints.subsets.unwrap()[0].addresses.as_ref().unwrap()[0].ip, "10.1.0.5");
    }

    #[tokio::test]
    async fn test_unchanged_resource_issues_no_writes() {
        let t = create_test_reconciler();
        let resource = IngressResource::from(create_test_global_load_balancer("tenant-a", "echo", 7000, "10.1.0.5"));
        t.reconciler.handle_l4(&resource).await.unwrap();
        let before = t.services.writes().len();

        t.reconciler.handle_l4(&resource).await.unwrap();

        assert_eq!(t.services.writes().len(), before);
    }

    #[tokio::test]
    async fn test_changed_ports_and_subsets_updated() {
        let t = create_test_reconciler();
        t.reconciler
            .handle_l4(&create_test_tcp_load_balancer("tenant-a", "echo", 7000, "10.1.0.5").into())
            .await
            .unwrap();

        t.reconciler
            .handle_l4(&create_test_tcp_load_balancer("tenant-a", "echo", 7001, "10.1.0.6").into())
            .await
            .unwrap();

        let service = t.services.object("tenant-a", "echo").unwrap();
        assert_eq!(service.spec.unwrap().ports.unwrap()[0].port, 7001);
        let endpoints = t.endpoints.object("tenant-a", "echo").unwrap();
        assert_eq!(endpoints.subsets.unwrap()[0].addresses.as_ref().unwrap()[0].ip, "10.1.0.6");
        let operations: Vec<_> = t.services.writes().iter().map(|w| w.operation).collect();
        assert_eq!(
            operations,
            vec![Operation::Create, Operation::Create, Operation::Update, Operation::Update]
        );
    }

    #[tokio::test]
    async fn test_endpoints_failure_keeps_service_and_retries_cleanly() {
        let t = create_test_reconciler();
        let resource = IngressResource::from(create_test_tcp_load_balancer("tenant-a", "echo", 7000, "10.1.0.5"));
        t.endpoints.fail_next(Operation::Create, Failure::Unavailable);

        assert!(t.reconciler.handle_l4(&resource).await.is_err());
        assert!(t.services.object("tenant-a", "echo").is_some());
        assert!(t.endpoints.object("tenant-a", "echo").is_none());

        t.reconciler.handle_l4(&resource).await.unwrap();
        assert!(t.endpoints.object("tenant-a", "echo").is_some());
        assert_eq!(t.services.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_deleting_resource_is_skipped() {
        let t = create_test_reconciler();
        let mut lb = create_test_tcp_load_balancer("tenant-a", "echo", 7000, "10.1.0.5");
        lb.metadata.deletion_timestamp = Some(
            serde_json::from_value(serde_json::json!("2024-01-01T00:00:00Z")).unwrap(),
        );

        t.reconciler.handle_l4(&lb.into()).await.unwrap();

        assert!(t.services.writes().is_empty());
    }

    #[tokio::test]
    async fn test_resource_without_uid_rejected() {
        let t = create_test_reconciler();
        let mut lb = create_test_tcp_load_balancer("tenant-a", "echo", 7000, "10.1.0.5");
        lb.metadata.uid = None;

        assert!(t.reconciler.handle_l4(&lb.into()).await.is_err());
        assert!(t.services.is_empty());
    }
}
