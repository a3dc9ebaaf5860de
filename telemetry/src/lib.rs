//! Session telemetry for Helm.
//!
//! A process-wide, append-only accumulator of per-turn metrics plus the
//! derived statistics consumed by the presentation layer. Cumulative
//! counters only ever grow; derived figures are pure functions of a
//! snapshot and are recomputed on every read.

mod aggregator;
mod metrics;
mod stats;
mod view;

pub use aggregator::{SubscriberId, TelemetryAggregator, TelemetryUpdate};
pub use metrics::{DecisionMetrics, FileChangeMetrics, ModelMetrics, SessionMetrics, ToolMetrics};
pub use stats::ComputedSessionStats;
pub use view::SessionStatsView;
