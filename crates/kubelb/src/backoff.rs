//! # Requeue Backoff
//!
//! Exponential backoff for requeueing failed reconciles, tracked per object
//! key, plus the bounded retry policy used for status conflicts.
//!
//! Sequence with the defaults: 5s, 10s, 20s, 40s, 80s, 160s, 300s (max).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Exponential backoff calculator
///
/// Each backoff doubles the previous one and the sequence is capped at `max`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Minimum backoff (for reset)
    min: Duration,
    /// Current backoff
    current: Duration,
    /// Maximum backoff
    max: Duration,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff between `min` and `max`
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            current: min,
            max,
        }
    }

    /// Get the next backoff duration and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;
        self.current = std::cmp::min(self.current.saturating_mul(2), self.max);
        result
    }

    /// Reset the backoff to the initial state
    pub fn reset(&mut self) {
        self.current = self.min;
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(300))
    }
}

/// Per-key backoff state shared by the reconcile and error-policy functions.
#[derive(Debug, Default)]
pub struct BackoffTracker {
    states: Mutex<HashMap<String, ExponentialBackoff>>,
}

impl BackoffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next requeue delay for `key`, advancing its sequence.
    pub fn next_for(&self, key: &str) -> Duration {
        match self.states.lock() {
            Ok(mut states) => states.entry(key.to_string()).or_default().next_backoff(),
            Err(e) => {
                tracing::warn!("Failed to lock backoff states: {}, using default backoff", e);
                ExponentialBackoff::default().next_backoff()
            }
        }
    }

    /// Forget the failures of `key` after a successful reconcile.
    pub fn reset(&self, key: &str) {
        if let Ok(mut states) = self.states.lock() {
            states.remove(key);
        }
    }
}

/// Bounded retry used for status updates on optimistic-concurrency conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub steps: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            steps: 5,
            delay: Duration::from_millis(10),
        }
    }
}
