//! Telemetry producer event shapes.
//!
//! These are the wire shapes emitted by the model-call and tool-call
//! completion paths. Helm consumes them; it does not define how they are
//! produced. Missing optional fields deserialize to zero so that malformed
//! partial data never fails recording.

use serde::{Deserialize, Serialize};

/// Per-call token breakdown for a completed model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub candidates_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub cached_tokens: u64,
}

impl TokenUsage {
    /// Commutative merge: saturating sums, so cumulative totals are
    /// independent of reporting order.
    pub fn merge(&mut self, other: &TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.candidates_tokens = self
            .candidates_tokens
            .saturating_add(other.candidates_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
        self.cached_tokens = self.cached_tokens.saturating_add(other.cached_tokens);
    }
}

/// Partial per-turn token counts.
///
/// Each field is independently optional; absent fields leave the previous
/// value in place. Used by the display-only last-turn refresh path, which is
/// narrower than the cumulative accounting path and must never be combined
/// with it for the same unit of work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageDelta {
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub candidates_tokens: Option<u64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// Outcome of a completed tool call.
///
/// Cancelled calls are reported as `Failure` by the transport layer rather
/// than dropped, so aggregate counts stay truthful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Success,
    Failure,
}

impl ToolOutcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, ToolOutcome::Success)
    }
}
