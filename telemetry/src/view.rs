//! Presentation read model over the aggregator.
//!
//! The view caches the latest snapshot and replaces it on every aggregator
//! notification. Derived statistics are computed on demand from the cache,
//! never memoized across updates. The subscription callback holds only a
//! weak handle to the cache, so dropping the view turns the callback into a
//! no-op instead of keeping state alive through the aggregator.

use std::cell::RefCell;
use std::rc::Rc;

use helm_types::{TokenUsage, UsageDelta};

use crate::aggregator::{SubscriberId, TelemetryAggregator};
use crate::metrics::SessionMetrics;
use crate::stats::ComputedSessionStats;

#[derive(Debug, Clone, Default)]
struct ViewState {
    metrics: SessionMetrics,
    last_turn: TokenUsage,
}

/// Read model consumed by the presentation layer.
#[derive(Debug)]
pub struct SessionStatsView {
    state: Rc<RefCell<ViewState>>,
    subscription: SubscriberId,
    prompt_count: u64,
}

impl SessionStatsView {
    /// Create a view subscribed to the aggregator's updates.
    ///
    /// The initial cache is seeded from the aggregator's current state, so
    /// a view attached mid-session starts consistent.
    pub fn subscribed(aggregator: &mut TelemetryAggregator) -> Self {
        let state = Rc::new(RefCell::new(ViewState {
            metrics: aggregator.metrics(),
            last_turn: aggregator.last_turn(),
        }));

        let cache = Rc::downgrade(&state);
        let subscription = aggregator.subscribe(move |update| {
            if let Some(cache) = cache.upgrade() {
                let mut state = cache.borrow_mut();
                state.metrics = update.metrics.clone();
                state.last_turn = update.last_turn;
            }
        });

        Self {
            state,
            subscription,
            prompt_count: 0,
        }
    }

    /// The subscription handle, for explicit detachment.
    #[must_use]
    pub fn subscription_id(&self) -> SubscriberId {
        self.subscription
    }

    /// Latest cached snapshot.
    #[must_use]
    pub fn metrics(&self) -> SessionMetrics {
        self.state.borrow().metrics.clone()
    }

    /// Derived statistics, recomputed from the cache on every call.
    #[must_use]
    pub fn computed(&self) -> ComputedSessionStats {
        ComputedSessionStats::from_metrics(&self.state.borrow().metrics)
    }

    /// Token counts of the most recent turn.
    #[must_use]
    pub fn last_turn(&self) -> TokenUsage {
        self.state.borrow().last_turn
    }

    #[must_use]
    pub fn last_prompt_token_count(&self) -> u64 {
        self.state.borrow().last_turn.prompt_tokens
    }

    /// Begin a new user prompt; increments the display ordinal only.
    pub fn start_new_prompt(&mut self) {
        self.prompt_count = self.prompt_count.saturating_add(1);
    }

    /// Alias for [`SessionStatsView::start_new_prompt`].
    pub fn start_new_turn(&mut self) {
        self.start_new_prompt();
    }

    #[must_use]
    pub fn prompt_count(&self) -> u64 {
        self.prompt_count
    }

    /// Restore the prompt ordinal from a resumed session document.
    pub fn restore_prompt_count(&mut self, count: u64) {
        self.prompt_count = count;
    }

    /// Refresh only the last-turn token fields from partial usage.
    ///
    /// This is the narrow display path: cumulative counters are untouched,
    /// and absent fields keep their previous value. A unit of work reported
    /// through the aggregator must not also be reported here.
    pub fn add_usage(&mut self, delta: UsageDelta) {
        let mut state = self.state.borrow_mut();
        if let Some(prompt) = delta.prompt_tokens {
            state.last_turn.prompt_tokens = prompt;
        }
        if let Some(candidates) = delta.candidates_tokens {
            state.last_turn.candidates_tokens = candidates;
        }
        if let Some(total) = delta.total_tokens {
            state.last_turn.total_tokens = total;
        }
    }
}
