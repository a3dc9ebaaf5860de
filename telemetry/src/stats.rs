//! Derived session statistics.
//!
//! Every figure here is a pure function of a [`SessionMetrics`] snapshot.
//! Nothing is stored as independently mutated state, so derived values can
//! never drift from the source counters.

use serde::Serialize;

use crate::metrics::SessionMetrics;

/// Derived statistics, recomputed on read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComputedSessionStats {
    pub total_api_time_ms: u64,
    pub total_tool_time_ms: u64,
    /// API time plus tool time.
    pub agent_active_time_ms: u64,
    pub api_time_percent: f64,
    pub tool_time_percent: f64,
    /// Cached tokens over prompt tokens; zero when no prompt tokens.
    pub cache_efficiency: f64,
    pub total_decisions: u64,
    /// Tool successes over tool invocations.
    pub success_rate: f64,
    /// Agreed decisions over total decisions.
    pub agreement_rate: f64,
    pub total_cached_tokens: u64,
    pub total_prompt_tokens: u64,
    pub total_lines_added: u64,
    pub total_lines_removed: u64,
}

/// Zero when the denominator is zero.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ComputedSessionStats {
    /// Compute all derived figures from a snapshot.
    #[must_use]
    pub fn from_metrics(metrics: &SessionMetrics) -> Self {
        let usage = metrics.total_usage();
        let tools = metrics.total_tool_metrics();
        let active_time_ms = metrics.api_time_ms.saturating_add(metrics.tool_time_ms);

        Self {
            total_api_time_ms: metrics.api_time_ms,
            total_tool_time_ms: metrics.tool_time_ms,
            agent_active_time_ms: active_time_ms,
            api_time_percent: ratio(metrics.api_time_ms, active_time_ms) * 100.0,
            tool_time_percent: ratio(metrics.tool_time_ms, active_time_ms) * 100.0,
            cache_efficiency: ratio(usage.cached_tokens, usage.prompt_tokens),
            total_decisions: metrics.decisions.total,
            success_rate: ratio(tools.successes, tools.invocations),
            agreement_rate: ratio(metrics.decisions.agreed, metrics.decisions.total),
            total_cached_tokens: usage.cached_tokens,
            total_prompt_tokens: usage.prompt_tokens,
            total_lines_added: metrics.files.lines_added,
            total_lines_removed: metrics.files.lines_removed,
        }
    }
}

#[cfg(test)]
mod tests {
    use helm_types::{TokenUsage, ToolOutcome};

    use super::*;

    #[test]
    fn empty_metrics_derive_all_zeroes() {
        let stats = ComputedSessionStats::from_metrics(&SessionMetrics::default());
        assert_eq!(stats.agent_active_time_ms, 0);
        assert_eq!(stats.api_time_percent, 0.0);
        assert_eq!(stats.tool_time_percent, 0.0);
        assert_eq!(stats.cache_efficiency, 0.0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.agreement_rate, 0.0);
    }

    #[test]
    fn cache_efficiency_is_cached_over_prompt() {
        let mut metrics = SessionMetrics::default();
        metrics
            .models
            .entry("model-a".to_string())
            .or_default()
            .record_call(&TokenUsage {
                prompt_tokens: 200,
                cached_tokens: 50,
                ..Default::default()
            });

        let stats = ComputedSessionStats::from_metrics(&metrics);
        assert!((stats.cache_efficiency - 0.25).abs() < f64::EPSILON);
        assert_eq!(stats.total_prompt_tokens, 200);
        assert_eq!(stats.total_cached_tokens, 50);
    }

    #[test]
    fn cache_efficiency_is_zero_without_prompt_tokens() {
        let mut metrics = SessionMetrics::default();
        metrics
            .models
            .entry("model-a".to_string())
            .or_default()
            .record_call(&TokenUsage {
                cached_tokens: 50,
                ..Default::default()
            });

        let stats = ComputedSessionStats::from_metrics(&metrics);
        assert_eq!(stats.cache_efficiency, 0.0);
    }

    #[test]
    fn success_rate_over_all_tools() {
        let mut metrics = SessionMetrics::default();
        let shell = metrics.tools.entry("shell".to_string()).or_default();
        shell.record_invocation(ToolOutcome::Success, 0);
        shell.record_invocation(ToolOutcome::Failure, 0);
        metrics
            .tools
            .entry("read_file".to_string())
            .or_default()
            .record_invocation(ToolOutcome::Success, 0);

        let stats = ComputedSessionStats::from_metrics(&metrics);
        assert!((stats.success_rate - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn time_percentages_split_active_time() {
        let metrics = SessionMetrics {
            api_time_ms: 300,
            tool_time_ms: 100,
            ..Default::default()
        };

        let stats = ComputedSessionStats::from_metrics(&metrics);
        assert_eq!(stats.agent_active_time_ms, 400);
        assert!((stats.api_time_percent - 75.0).abs() < f64::EPSILON);
        assert!((stats.tool_time_percent - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn agreement_rate_from_decisions() {
        let mut metrics = SessionMetrics::default();
        metrics.decisions.total = 4;
        metrics.decisions.agreed = 3;

        let stats = ComputedSessionStats::from_metrics(&metrics);
        assert_eq!(stats.total_decisions, 4);
        assert!((stats.agreement_rate - 0.75).abs() < f64::EPSILON);
    }
}
