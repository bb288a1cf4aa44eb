//! Per-host mutual exclusion for concurrent workers.
//!
//! With the worker pool enabled, two identifiers may land on the same
//! publisher. The guard serializes strategy evaluation and document download
//! per landing host so one site never sees parallel scraping from this process.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument};

/// Hands out one permit per host at a time.
///
/// Designed to be wrapped in `Arc` and shared across spawned Tokio tasks.
#[derive(Debug, Default)]
pub struct HostGuard {
    disabled: bool,
    /// Arc'd so the `DashMap` shard lock is released before awaiting the mutex.
    hosts: DashMap<String, Arc<Mutex<()>>>,
}

/// Held while working against a host; released on drop.
#[derive(Debug)]
pub struct HostPermit {
    _guard: Option<OwnedMutexGuard<()>>,
}

impl HostGuard {
    /// Creates an active guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a guard that never blocks (sequential runs).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            hosts: DashMap::new(),
        }
    }

    /// Returns whether the guard is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Waits until no other worker holds the host of `url`.
    #[instrument(level = "debug", skip(self), fields(host))]
    pub async fn acquire(&self, url: &str) -> HostPermit {
        if self.disabled {
            return HostPermit { _guard: None };
        }

        let host = extract_host(url);
        tracing::Span::current().record("host", host.as_str());

        let lock = self
            .hosts
            .entry(host.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = lock.lock_owned().await;
        debug!(host = %host, "host permit acquired");
        HostPermit {
            _guard: Some(guard),
        }
    }
}

/// Lowercase host of `url`, or `"unknown"` when it does not parse.
#[must_use]
pub fn extract_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| "unknown".to_string())
}
