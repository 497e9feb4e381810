//! Main controller implementation.
//!
//! Spawns one watcher per legacy ingress kind plus the LoadBalancer snapshot
//! watcher, and stops when any of them exits.

use crate::config::Config;
use crate::error::ControllerError;
use crate::reconciler::LegacyReconciler;
use crate::snapshot::SnapshotReconciler;
use crate::watcher::{Context, Watcher};
use crds::{GlobalLoadBalancer, HTTPLoadBalancer, LoadBalancer, TCPLoadBalancer};
use k8s_openapi::api::core::v1::{Endpoints, Service};
use kube::Client;
use kubelb::{BackoffTracker, InMemorySnapshotCache};
use kubelb_store::KubeStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for the management cluster.
pub struct Controller {
    tcp_load_balancer_watcher: JoinHandle<Result<(), ControllerError>>,
    http_load_balancer_watcher: JoinHandle<Result<(), ControllerError>>,
    global_load_balancer_watcher: JoinHandle<Result<(), ControllerError>>,
    load_balancer_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its watchers.
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing KubeLB Manager");

        let client = Client::try_default().await?;

        let context = Arc::new(Context {
            reconciler: LegacyReconciler::new(
                Arc::new(KubeStore::<Service>::new(client.clone())),
                Arc::new(KubeStore::<Endpoints>::new(client.clone())),
            ),
            backoff: BackoffTracker::new(),
        });
        let snapshots = Arc::new(SnapshotReconciler::new(
            Arc::new(KubeStore::<LoadBalancer>::new(client.clone())),
            Arc::new(InMemorySnapshotCache::new()),
        ));

        let watcher = Arc::new(Watcher::new(
            context,
            snapshots,
            client,
            config.watch_namespace,
            config.concurrency,
        ));

        let w = Arc::clone(&watcher);
        let tcp_load_balancer_watcher =
            tokio::spawn(async move { w.watch_ingress::<TCPLoadBalancer>().await });
        let w = Arc::clone(&watcher);
        let http_load_balancer_watcher =
            tokio::spawn(async move { w.watch_ingress::<HTTPLoadBalancer>().await });
        let w = Arc::clone(&watcher);
        let global_load_balancer_watcher =
            tokio::spawn(async move { w.watch_ingress::<GlobalLoadBalancer>().await });
        let w = Arc::clone(&watcher);
        let load_balancer_watcher = tokio::spawn(async move { w.watch_load_balancers().await });

        Ok(Self {
            tcp_load_balancer_watcher,
            http_load_balancer_watcher,
            global_load_balancer_watcher,
            load_balancer_watcher,
        })
    }

    /// Runs the controller until a watcher exits.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("KubeLB Manager running");

        tokio::select! {
            result = &mut self.tcp_load_balancer_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("TCPLoadBalancer watcher panicked: {}", e)))??;
            }
            result = &mut self.http_load_balancer_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("HTTPLoadBalancer watcher panicked: {}", e)))??;
            }
            result = &mut self.global_load_balancer_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("GlobalLoadBalancer watcher panicked: {}", e)))??;
            }
            result = &mut self.load_balancer_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("LoadBalancer watcher panicked: {}", e)))??;
            }
        }

        info!("KubeLB Manager stopped");
        Ok(())
    }
}
