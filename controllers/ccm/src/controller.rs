//! Main controller implementation.
//!
//! Builds the tenant and management cluster clients, wires the reconciler
//! to their stores and runs the Service watcher.

use crate::admission::AdmissionGate;
use crate::config::Config;
use crate::correlator::CrossClusterCorrelator;
use crate::endpoints::EndpointResolver;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::status::StatusPropagator;
use crate::watcher::{Context, Watcher};
use crds::LoadBalancer;
use k8s_openapi::api::core::v1::Service;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client};
use kubelb::{BackoffTracker, RetryPolicy};
use kubelb_store::KubeStore;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Main controller for the tenant cluster.
pub struct Controller {
    watcher: Watcher,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing KubeLB Cloud Controller");

        let tenant_client = Client::try_default().await?;
        let kubelb_client = match &config.kubelb_kubeconfig {
            Some(path) => management_client(path).await?,
            None => tenant_client.clone(),
        };

        let service_api: Api<Service> = match &config.watch_namespace {
            Some(ns) => Api::namespaced(tenant_client.clone(), ns),
            None => Api::all(tenant_client.clone()),
        };
        let load_balancer_api: Api<LoadBalancer> =
            Api::namespaced(kubelb_client.clone(), &config.cluster_name);

        let reconciler = Reconciler::new(
            Arc::new(KubeStore::<Service>::new(tenant_client)),
            Arc::new(KubeStore::<LoadBalancer>::new(kubelb_client)),
            config.cluster_name.clone(),
            AdmissionGate::new(config.service_class.clone(), config.cloud_controller),
            EndpointResolver::new(config.cloud_controller, config.cluster_endpoints.clone()),
            StatusPropagator::new(RetryPolicy::default()),
        );

        let context = Arc::new(Context {
            reconciler,
            backoff: BackoffTracker::new(),
        });

        let watcher = Watcher::new(
            context,
            service_api,
            load_balancer_api,
            CrossClusterCorrelator::new(config.cluster_name),
            config.concurrency,
        );

        Ok(Self { watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("KubeLB Cloud Controller running");
        self.watcher.watch_services().await
    }
}

/// Client for the management cluster from an explicit kubeconfig file.
async fn management_client(path: &Path) -> Result<Client, ControllerError> {
    let kubeconfig = Kubeconfig::read_from(path)
        .map_err(|e| ControllerError::Kubeconfig(format!("{}: {}", path.display(), e)))?;
    let config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| ControllerError::Kubeconfig(format!("{}: {}", path.display(), e)))?;
    Ok(Client::try_from(config)?)
}
