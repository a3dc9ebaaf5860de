//! Cumulative session metrics.
//!
//! All counters are monotonically non-decreasing for the lifetime of the
//! process and are merged with saturating adds, so final totals are
//! independent of reporting order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use helm_types::{TokenUsage, ToolOutcome};

/// Cumulative usage for one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Number of completed API calls attributed to this model.
    pub calls: u64,
    /// Token totals aggregated across those calls.
    pub usage: TokenUsage,
}

impl ModelMetrics {
    pub(crate) fn record_call(&mut self, usage: &TokenUsage) {
        self.calls = self.calls.saturating_add(1);
        self.usage.merge(usage);
    }
}

/// Cumulative usage for one tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMetrics {
    pub invocations: u64,
    pub successes: u64,
    pub failures: u64,
    pub total_duration_ms: u64,
}

impl ToolMetrics {
    pub(crate) fn record_invocation(&mut self, outcome: ToolOutcome, duration_ms: u64) {
        self.invocations = self.invocations.saturating_add(1);
        match outcome {
            ToolOutcome::Success => self.successes = self.successes.saturating_add(1),
            ToolOutcome::Failure => self.failures = self.failures.saturating_add(1),
        }
        self.total_duration_ms = self.total_duration_ms.saturating_add(duration_ms);
    }
}

/// Decision counters for proposed actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionMetrics {
    /// Total decisions recorded.
    pub total: u64,
    /// Decisions where the user agreed with the proposal (auto-accepted
    /// decisions count as agreed).
    pub agreed: u64,
}

/// Line counts across file-modifying tool calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeMetrics {
    pub lines_added: u64,
    pub lines_removed: u64,
}

/// The session-scoped, monotonically-growing aggregate.
///
/// This is the source of truth; every derived figure is recomputed from a
/// snapshot of this state and never stored alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Per-model usage breakdown, keyed by model id.
    pub models: BTreeMap<String, ModelMetrics>,
    /// Per-tool usage breakdown, keyed by tool name.
    pub tools: BTreeMap<String, ToolMetrics>,
    /// Cumulative API wall-time across all model calls.
    pub api_time_ms: u64,
    /// Cumulative tool wall-time across all tool calls.
    pub tool_time_ms: u64,
    pub decisions: DecisionMetrics,
    pub files: FileChangeMetrics,
}

impl SessionMetrics {
    /// Token totals summed across all models.
    #[must_use]
    pub fn total_usage(&self) -> TokenUsage {
        let mut total = TokenUsage::default();
        for metrics in self.models.values() {
            total.merge(&metrics.usage);
        }
        total
    }

    /// Invocation/success/failure totals summed across all tools.
    #[must_use]
    pub fn total_tool_metrics(&self) -> ToolMetrics {
        let mut total = ToolMetrics::default();
        for metrics in self.tools.values() {
            total.invocations = total.invocations.saturating_add(metrics.invocations);
            total.successes = total.successes.saturating_add(metrics.successes);
            total.failures = total.failures.saturating_add(metrics.failures);
            total.total_duration_ms = total
                .total_duration_ms
                .saturating_add(metrics.total_duration_ms);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_metrics_accumulate_calls() {
        let mut metrics = ModelMetrics::default();
        metrics.record_call(&TokenUsage {
            prompt_tokens: 10,
            candidates_tokens: 5,
            total_tokens: 15,
            cached_tokens: 0,
        });
        metrics.record_call(&TokenUsage {
            prompt_tokens: 20,
            candidates_tokens: 5,
            total_tokens: 25,
            cached_tokens: 8,
        });

        assert_eq!(metrics.calls, 2);
        assert_eq!(metrics.usage.prompt_tokens, 30);
        assert_eq!(metrics.usage.cached_tokens, 8);
    }

    #[test]
    fn tool_metrics_split_outcomes() {
        let mut metrics = ToolMetrics::default();
        metrics.record_invocation(ToolOutcome::Success, 100);
        metrics.record_invocation(ToolOutcome::Failure, 50);
        metrics.record_invocation(ToolOutcome::Success, 25);

        assert_eq!(metrics.invocations, 3);
        assert_eq!(metrics.successes, 2);
        assert_eq!(metrics.failures, 1);
        assert_eq!(metrics.total_duration_ms, 175);
    }

    #[test]
    fn total_usage_sums_across_models() {
        let mut session = SessionMetrics::default();
        session
            .models
            .entry("model-a".to_string())
            .or_default()
            .record_call(&TokenUsage {
                prompt_tokens: 10,
                ..Default::default()
            });
        session
            .models
            .entry("model-b".to_string())
            .or_default()
            .record_call(&TokenUsage {
                prompt_tokens: 7,
                cached_tokens: 3,
                ..Default::default()
            });

        let total = session.total_usage();
        assert_eq!(total.prompt_tokens, 17);
        assert_eq!(total.cached_tokens, 3);
    }

    #[test]
    fn session_metrics_serde_roundtrip() {
        let mut session = SessionMetrics::default();
        session
            .tools
            .entry("read_file".to_string())
            .or_default()
            .record_invocation(ToolOutcome::Success, 12);
        session.decisions.total = 2;
        session.decisions.agreed = 1;

        let json = serde_json::to_string(&session).unwrap();
        let back: SessionMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
