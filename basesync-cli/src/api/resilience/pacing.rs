//! Request pacer implementation
//!
//! Spaces consecutive schema calls so a long run of field additions stays
//! under Airtable's per-base request rate.

use super::config::PacingConfig;
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Mutex-guarded pacer enforcing a minimum interval between requests
#[derive(Debug, Clone)]
pub struct RequestPacer {
    config: PacingConfig,
    last_request: Arc<Mutex<Option<Instant>>>,
    requests_paced: Arc<AtomicU64>,
    requests_delayed: Arc<AtomicU64>,
}

/// Statistics about the pacer's activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacerStats {
    pub requests_paced: u64,
    pub requests_delayed: u64,
}

impl RequestPacer {
    /// Create a new pacer with the given configuration
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            last_request: Arc::new(Mutex::new(None)),
            requests_paced: Arc::new(AtomicU64::new(0)),
            requests_delayed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Wait until the next request may be sent.
    /// Holding the lock across the sleep keeps concurrent callers in order.
    pub async fn wait(&self) {
        let interval = self.config.min_interval();
        if interval.is_zero() {
            self.requests_paced.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                let delay = interval - elapsed;
                self.requests_delayed.fetch_add(1, Ordering::Relaxed);
                debug!("Request pacer: delaying next request by {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }
        *last = Some(Instant::now());
        self.requests_paced.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current pacer statistics
    pub fn stats(&self) -> PacerStats {
        PacerStats {
            requests_paced: self.requests_paced.load(Ordering::Relaxed),
            requests_delayed: self.requests_delayed.load(Ordering::Relaxed),
        }
    }
}
