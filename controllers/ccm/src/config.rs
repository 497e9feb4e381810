//! Environment configuration.

use crate::error::ControllerError;
use kubelb::annotations::{SERVICE_CLASS_ANNOTATION, SERVICE_CLASS_KUBELB};
use kubelb::MatchingAnnotation;
use std::env;
use std::path::PathBuf;

const DEFAULT_CONCURRENCY: u16 = 4;

/// Cloud controller settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Cluster identity; also the management-cluster namespace
    pub cluster_name: String,
    /// Kubeconfig of the management cluster, default client config when unset
    pub kubelb_kubeconfig: Option<PathBuf>,
    /// Act as the cluster's sole load balancer provider
    pub cloud_controller: bool,
    /// Node addresses used as backends when no existing LB is fronted
    pub cluster_endpoints: Vec<String>,
    /// Annotation a Service must carry to be admitted
    pub service_class: MatchingAnnotation,
    /// Restrict the Service watch to one namespace
    pub watch_namespace: Option<String>,
    /// Parallel reconciles across distinct Services
    pub concurrency: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let cluster_name = non_empty("CLUSTER_NAME").ok_or_else(|| {
            ControllerError::InvalidConfig(
                "CLUSTER_NAME environment variable is required".to_string(),
            )
        })?;

        let cloud_controller = match non_empty("CLOUD_CONTROLLER") {
            None => false,
            Some(value) => value.trim().parse::<bool>().map_err(|_| {
                ControllerError::InvalidConfig(format!(
                    "CLOUD_CONTROLLER must be true or false, got {value:?}"
                ))
            })?,
        };

        let cluster_endpoints = non_empty("CLUSTER_ENDPOINTS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|endpoint| !endpoint.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let service_class = MatchingAnnotation::new(
            non_empty("SERVICE_CLASS_ANNOTATION").unwrap_or_else(|| SERVICE_CLASS_ANNOTATION.to_string()),
            non_empty("SERVICE_CLASS_VALUE").unwrap_or_else(|| SERVICE_CLASS_KUBELB.to_string()),
        );

        let concurrency = match non_empty("RECONCILE_CONCURRENCY") {
            None => DEFAULT_CONCURRENCY,
            Some(value) => value
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|concurrency| *concurrency > 0)
                .ok_or_else(|| {
                    ControllerError::InvalidConfig(format!(
                        "RECONCILE_CONCURRENCY must be a positive integer, got {value:?}"
                    ))
                })?,
        };

        Ok(Self {
            cluster_name,
            kubelb_kubeconfig: non_empty("KUBELB_KUBECONFIG").map(PathBuf::from),
            cloud_controller,
            cluster_endpoints,
            service_class,
            watch_namespace: non_empty("WATCH_NAMESPACE"),
            concurrency,
        })
    }
}
