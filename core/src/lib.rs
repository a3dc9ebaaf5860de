//! Mode governance for Helm.
//!
//! This crate owns the operating-mode state machine: the immutable mode
//! catalog, the single-active-mode controller with synchronous change
//! notification, the per-call capability gate, and the rendering of
//! mode-scoped instruction text injected into the conversation.

mod builtin;
mod controller;
mod gate;
mod registry;
mod reminder;

pub use builtin::{agent_mode, agent_mode_id, plan_mode, plan_mode_id};
pub use controller::{ModeChanged, ModeController, ObserverId};
pub use gate::{CapabilityGate, GateDecision};
pub use registry::{ModeError, ModeRegistry};
pub use reminder::{mode_entry_context, render_reminder};
