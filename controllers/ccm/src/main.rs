//! KubeLB Cloud Controller
//!
//! Runs in a tenant cluster and keeps one management-cluster `LoadBalancer`
//! per admitted Service:
//! - Service changes are mapped and reconciled into the management cluster
//! - LoadBalancer changes are routed back to the originating Service
//! - LoadBalancer ingress is copied into the Service status

mod admission;
mod config;
mod controller;
mod correlator;
mod endpoints;
mod error;
mod finalizer;
mod reconciler;
mod status;
mod watcher;
#[cfg(test)]
mod test_utils;

use crate::config::Config;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    // Must happen before any kube client is built
    let _ = rustls::crypto::ring::default_provider().install_default();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting KubeLB Cloud Controller");

    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  Cluster name: {}", config.cluster_name);
    info!("  Cloud controller mode: {}", config.cloud_controller);
    info!("  Cluster endpoints: {:?}", config.cluster_endpoints);
    info!("  Namespace: {}", config.watch_namespace.as_deref().unwrap_or("all namespaces"));

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
