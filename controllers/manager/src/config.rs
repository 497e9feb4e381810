//! Environment configuration.

use crate::error::ControllerError;
use std::env;

const DEFAULT_CONCURRENCY: u16 = 4;

/// Manager settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Restrict every watch to one namespace
    pub watch_namespace: Option<String>,
    /// Parallel reconciles per controller
    pub concurrency: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

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
            watch_namespace: non_empty("WATCH_NAMESPACE"),
            concurrency,
        })
    }
}
