//! KubeLB Manager
//!
//! Runs in the management cluster:
//! - TCPLoadBalancer, HTTPLoadBalancer and GlobalLoadBalancer resources are
//!   expanded into an owned Service plus Endpoints pair
//! - LoadBalancer resources are grouped per tenant namespace and handed to
//!   the data-plane snapshot cache

mod config;
mod controller;
mod error;
mod reconciler;
mod snapshot;
mod watcher;
#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod reconciler_test;

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

    info!("Starting KubeLB Manager");

    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", config.watch_namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Reconcile concurrency: {}", config.concurrency);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
