//! Append-only telemetry accumulator.
//!
//! The aggregator is mutated exactly once per completed unit of work (one
//! model call or one tool call) and notifies subscribers synchronously, in
//! the order events were recorded. Recording never fails: malformed or
//! missing optional data contributes zero rather than raising.

use std::fmt;

use helm_types::{TokenUsage, ToolOutcome};

use crate::metrics::SessionMetrics;

/// Payload delivered to subscribers after every recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryUpdate {
    /// Snapshot of cumulative state at the time of the event.
    pub metrics: SessionMetrics,
    /// Token counts of the most recent turn.
    pub last_turn: TokenUsage,
}

/// Handle for a registered subscriber, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Process-wide accumulator of per-turn metrics.
pub struct TelemetryAggregator {
    metrics: SessionMetrics,
    last_turn: TokenUsage,
    subscribers: Vec<(SubscriberId, Box<dyn FnMut(&TelemetryUpdate)>)>,
    next_subscriber: u64,
}

impl fmt::Debug for TelemetryAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryAggregator")
            .field("metrics", &self.metrics)
            .field("last_turn", &self.last_turn)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for TelemetryAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            metrics: SessionMetrics::default(),
            last_turn: TokenUsage::default(),
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    /// Merge one completed model call into the per-model cumulative record,
    /// creating the record on first use, and overwrite the last-turn token
    /// counts.
    ///
    /// `duration_ms` is the call's wall time, accumulated into the session's
    /// API time. Callers report each real call exactly once.
    pub fn record_model_usage(&mut self, model_id: &str, usage: TokenUsage, duration_ms: u64) {
        self.metrics
            .models
            .entry(model_id.to_string())
            .or_default()
            .record_call(&usage);
        self.metrics.api_time_ms = self.metrics.api_time_ms.saturating_add(duration_ms);
        self.last_turn = usage;

        tracing::debug!(
            model = model_id,
            prompt_tokens = usage.prompt_tokens,
            total_tokens = usage.total_tokens,
            "model usage recorded"
        );
        self.notify();
    }

    /// Count one completed tool call, creating the per-tool record on first
    /// use. Cancelled calls must be reported as `Failure`, never dropped.
    pub fn record_tool_invocation(
        &mut self,
        tool_name: &str,
        outcome: ToolOutcome,
        duration_ms: u64,
    ) {
        self.metrics
            .tools
            .entry(tool_name.to_string())
            .or_default()
            .record_invocation(outcome, duration_ms);
        self.metrics.tool_time_ms = self.metrics.tool_time_ms.saturating_add(duration_ms);

        tracing::debug!(tool = tool_name, ?outcome, duration_ms, "tool call recorded");
        self.notify();
    }

    /// Count one decision on a proposed action.
    pub fn record_decision(&mut self, agreed: bool) {
        self.metrics.decisions.total = self.metrics.decisions.total.saturating_add(1);
        if agreed {
            self.metrics.decisions.agreed = self.metrics.decisions.agreed.saturating_add(1);
        }
        self.notify();
    }

    /// Add line counts from one file-modifying tool call.
    pub fn record_edit(&mut self, lines_added: u64, lines_removed: u64) {
        self.metrics.files.lines_added = self.metrics.files.lines_added.saturating_add(lines_added);
        self.metrics.files.lines_removed = self
            .metrics
            .files
            .lines_removed
            .saturating_add(lines_removed);
        self.notify();
    }

    /// Snapshot of the cumulative state. The copy is unaffected by any
    /// later recording.
    #[must_use]
    pub fn metrics(&self) -> SessionMetrics {
        self.metrics.clone()
    }

    /// Token counts of the most recent turn (zero before the first one).
    #[must_use]
    pub fn last_turn(&self) -> TokenUsage {
        self.last_turn
    }

    /// Prompt-token count of the most recent turn, zero if no turn has
    /// completed.
    #[must_use]
    pub fn last_prompt_token_count(&self) -> u64 {
        self.last_turn.prompt_tokens
    }

    /// Register a subscriber; it receives one update per recorded event,
    /// synchronously, in the order events were recorded.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&TelemetryUpdate) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a previously registered subscriber. Returns `false` if the id
    /// was already gone.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let update = TelemetryUpdate {
            metrics: self.metrics.clone(),
            last_turn: self.last_turn,
        };
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&update);
        }
    }
}
