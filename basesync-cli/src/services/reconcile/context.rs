//! Per-run context passed explicitly into the reconciler

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Identity and metrics of one reconciliation run
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: String,
    started_at: DateTime<Utc>,
    pub metrics: RunMetrics,
}

/// Counters per store operation type
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunMetrics {
    operations: BTreeMap<String, OperationMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetrics {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub total_ms: u64,
}

impl RunContext {
    pub fn new() -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self::with_run_id(&id[..8])
    }

    pub fn with_run_id(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Utc::now(),
            metrics: RunMetrics::default(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunMetrics {
    /// Record the outcome of one store call
    pub fn record(&mut self, operation: &str, success: bool, elapsed: Duration) {
        let entry = self.operations.entry(operation.to_string()).or_default();
        entry.attempts += 1;
        if success {
            entry.successes += 1;
        } else {
            entry.failures += 1;
        }
        entry.total_ms += u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    }

    #[cfg(test)]
    pub fn get(&self, operation: &str) -> Option<&OperationMetrics> {
        self.operations.get(operation)
    }

    /// Number of store calls made, successful or not
    pub fn total_calls(&self) -> u64 {
        self.operations.values().map(|m| m.attempts).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.operations.values().map(|m| m.failures).sum()
    }

    /// Single-line summary for the end-of-run log
    pub fn summary_line(&self) -> String {
        if self.operations.is_empty() {
            return "no store calls".to_string();
        }
        self.operations
            .iter()
            .map(|(op, m)| {
                format!(
                    "{}: {}/{} ok in {}ms",
                    op, m.successes, m.attempts, m.total_ms
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_is_short() {
        let ctx = RunContext::new();
        assert_eq!(ctx.run_id().len(), 8);
        assert_ne!(RunContext::new().run_id(), ctx.run_id());
    }

    #[test]
    fn test_metrics_record() {
        let mut metrics = RunMetrics::default();
        metrics.record("add_field", true, Duration::from_millis(120));
        metrics.record("add_field", false, Duration::from_millis(80));
        metrics.record("fetch_schema", true, Duration::from_millis(40));

        assert_eq!(
            metrics.get("add_field"),
            Some(&OperationMetrics {
                attempts: 2,
                successes: 1,
                failures: 1,
                total_ms: 200,
            })
        );
        assert_eq!(metrics.total_calls(), 3);
        assert_eq!(metrics.total_failures(), 1);
        assert_eq!(
            metrics.summary_line(),
            "add_field: 1/2 ok in 200ms, fetch_schema: 1/1 ok in 40ms"
        );
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(RunMetrics::default().summary_line(), "no store calls");
    }
}
