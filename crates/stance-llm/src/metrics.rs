//! Process-wide counters for the study service

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared metrics collector
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total LLM calls
    pub llm_calls: AtomicU64,
    /// Total LLM errors
    pub llm_errors: AtomicU64,
    /// Total tokens used
    pub tokens_used: AtomicU64,
    /// Conversations opened (any condition)
    pub sessions_started: AtomicU64,
    /// Follow-up turns served
    pub continuations: AtomicU64,
    /// Study records persisted
    pub submissions: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an LLM call
    pub fn record_llm_call(&self, tokens: u64, error: bool) {
        self.llm_calls.fetch_add(1, Ordering::Relaxed);
        self.tokens_used.fetch_add(tokens, Ordering::Relaxed);
        if error {
            self.llm_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_continuation(&self) {
        self.continuations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_submission(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            llm_calls: self.llm_calls.load(Ordering::Relaxed),
            llm_errors: self.llm_errors.load(Ordering::Relaxed),
            tokens_used: self.tokens_used.load(Ordering::Relaxed),
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            continuations: self.continuations.load(Ordering::Relaxed),
            submissions: self.submissions.load(Ordering::Relaxed),
        }
    }

    /// Get LLM error rate
    pub fn llm_error_rate(&self) -> f64 {
        self.snapshot().llm_error_rate()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub llm_calls: u64,
    pub llm_errors: u64,
    pub tokens_used: u64,
    pub sessions_started: u64,
    pub continuations: u64,
    pub submissions: u64,
}

impl MetricsSnapshot {
    pub fn llm_error_rate(&self) -> f64 {
        if self.llm_calls == 0 {
            0.0
        } else {
            self.llm_errors as f64 / self.llm_calls as f64
        }
    }

    /// Export metrics in Prometheus text format
    pub fn to_prometheus(&self) -> String {
        let counters = [
            ("llm_calls_total", "Total number of LLM API calls", self.llm_calls),
            ("llm_errors_total", "Total number of LLM API errors", self.llm_errors),
            ("tokens_used_total", "Total tokens consumed by LLM calls", self.tokens_used),
            ("sessions_started_total", "Conversations opened", self.sessions_started),
            ("continuations_total", "Follow-up turns served", self.continuations),
            ("submissions_total", "Study records persisted", self.submissions),
        ];

        let mut output = String::new();
        for (name, help, value) in counters {
            let _ = writeln!(output, "# HELP stance_{name} {help}");
            let _ = writeln!(output, "# TYPE stance_{name} counter");
            let _ = writeln!(output, "stance_{name} {value}");
        }

        let _ = writeln!(output, "# HELP stance_llm_error_rate Current LLM error rate");
        let _ = writeln!(output, "# TYPE stance_llm_error_rate gauge");
        let _ = writeln!(output, "stance_llm_error_rate {:.4}", self.llm_error_rate());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.record_llm_call(100, false);
        metrics.record_llm_call(0, true);
        metrics.record_session_started();
        metrics.record_continuation();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.llm_calls, 2);
        assert_eq!(snapshot.llm_errors, 1);
        assert_eq!(snapshot.tokens_used, 100);
        assert_eq!(snapshot.sessions_started, 1);
        assert_eq!(snapshot.continuations, 1);
        assert_eq!(snapshot.submissions, 0);
        assert_eq!(metrics.llm_error_rate(), 0.5);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        metrics.record_submission();
        let text = metrics.snapshot().to_prometheus();
        assert!(text.contains("# TYPE stance_submissions_total counter\n"));
        assert!(text.contains("stance_submissions_total 1\n"));
        assert!(text.contains("stance_llm_error_rate 0.0000\n"));
    }
}
