//! Kubernetes resource watchers.
//!
//! Runs the Service controller: tenant Service events feed it directly,
//! management-cluster LoadBalancer events are routed back to their Service
//! through the [`CrossClusterCorrelator`].

use crate::correlator::CrossClusterCorrelator;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::LoadBalancer;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Service;
use kube::{Api, ResourceExt};
use kube_runtime::controller::{self, Action};
use kube_runtime::{watcher, Controller};
use kubelb::BackoffTracker;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared state handed to every reconcile.
pub struct Context {
    pub reconciler: Reconciler,
    pub backoff: BackoffTracker,
}

fn key_of(service: &Service) -> String {
    format!("{}/{}", service.namespace().unwrap_or_default(), service.name_any())
}

/// Drops the backoff of a Service that left the controller's store.
fn forget_missing(backoff: &BackoffTracker, error: &controller::Error<ControllerError, watcher::Error>) -> bool {
    match error {
        controller::Error::ObjectNotFound(object) => {
            let key = format!("{}/{}", object.namespace.as_deref().unwrap_or_default(), object.name);
            debug!("Service {} is gone, dropping its backoff", key);
            backoff.reset(&key);
            true
        }
        _ => false,
    }
}

async fn reconcile(service: Arc<Service>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let namespace = service.namespace().unwrap_or_default();
    let name = service.name_any();
    ctx.reconciler.reconcile_service(&namespace, &name).await?;
    ctx.backoff.reset(&key_of(&service));
    Ok(Action::await_change())
}

fn error_policy(service: Arc<Service>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let delay = ctx.backoff.next_for(&key_of(&service));
    warn!("Failed to reconcile Service {}: {}, requeue in {:?}", key_of(&service), error, delay);
    Action::requeue(delay)
}

/// Watches tenant Services and management-cluster LoadBalancers.
pub struct Watcher {
    context: Arc<Context>,
    service_api: Api<Service>,
    load_balancer_api: Api<LoadBalancer>,
    correlator: CrossClusterCorrelator,
    concurrency: u16,
}

impl Watcher {
    pub fn new(
        context: Arc<Context>,
        service_api: Api<Service>,
        load_balancer_api: Api<LoadBalancer>,
        correlator: CrossClusterCorrelator,
        concurrency: u16,
    ) -> Self {
        Self {
            context,
            service_api,
            load_balancer_api,
            correlator,
            concurrency,
        }
    }

    /// Runs until a shutdown signal arrives.
    pub async fn watch_services(self) -> Result<(), ControllerError> {
        info!("Starting Service watcher");

        let correlator = self.correlator;
        let context = Arc::clone(&self.context);
        Controller::new(self.service_api, watcher::Config::default())
            .watches(self.load_balancer_api, watcher::Config::default(), move |lb| {
                correlator.correlate(&lb)
            })
            .with_config(controller::Config::default().concurrency(self.concurrency))
            .shutdown_on_signal()
            .run(reconcile, error_policy, self.context)
            .for_each(|result| {
                let context = Arc::clone(&context);
                async move {
                    match result {
                        Ok((object, _)) => debug!("Reconciled Service {}", object),
                        Err(e) if forget_missing(&context.backoff, &e) => {}
                        Err(e) => error!("Service controller error: {}", e),
                    }
                }
            })
            .await;

        info!("Service watcher stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube_runtime::reflector::ObjectRef;
    use std::time::Duration;

    #[test]
    fn test_missing_service_backoff_forgotten() {
        let backoff = BackoffTracker::new();
        backoff.next_for("default/web");
        backoff.next_for("default/web");

        let missing = controller::Error::ObjectNotFound(ObjectRef::<Service>::new("web").within("default").erase());

        assert!(forget_missing(&backoff, &missing));
        assert_eq!(backoff.next_for("default/web"), Duration::from_secs(5));
    }

    #[test]
    fn test_other_errors_keep_backoff() {
        let backoff = BackoffTracker::new();
        backoff.next_for("default/web");

        let failed = controller::Error::ReconcilerFailed(
            ControllerError::InvalidConfig("boom".to_string()),
            ObjectRef::<Service>::new("web").within("default").erase(),
        );

        assert!(!forget_missing(&backoff, &failed));
        assert_eq!(backoff.next_for("default/web"), Duration::from_secs(10));
    }
}
