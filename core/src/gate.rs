//! Per-call capability gate.
//!
//! The gate answers "is this capability available in the active mode".
//! Denial is not an error: it is a normal negative result the calling layer
//! must surface to the model as an unavailable-tool condition, never as a
//! runtime failure. Every check re-reads the active mode, so a mode switch
//! is observed by the very next call.

use helm_types::ModeId;

use crate::controller::ModeController;

/// Result of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    /// The active mode excludes this capability.
    DeniedByMode { mode: ModeId },
}

impl GateDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }
}

/// Capability gate over the session's mode controller.
///
/// Borrowing the controller keeps the check honest: the gate cannot cache a
/// mode across a switch because it never holds one.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityGate<'a> {
    controller: &'a ModeController,
}

impl<'a> CapabilityGate<'a> {
    #[must_use]
    pub fn new(controller: &'a ModeController) -> Self {
        Self { controller }
    }

    /// Check a candidate capability against the active mode.
    #[must_use]
    pub fn check(&self, capability: &str) -> GateDecision {
        let mode = self.controller.current();
        if mode.excludes(capability) {
            GateDecision::DeniedByMode {
                mode: mode.id().clone(),
            }
        } else {
            GateDecision::Allowed
        }
    }

    /// Shorthand for `check(..).is_allowed()`.
    #[must_use]
    pub fn is_allowed(&self, capability: &str) -> bool {
        self.check(capability).is_allowed()
    }

    /// Retain the currently invokable subset of `capabilities`.
    ///
    /// Used by hosts to refresh their command/tool listing after a switch.
    pub fn filter_available<'n>(
        &self,
        capabilities: impl IntoIterator<Item = &'n str>,
    ) -> Vec<&'n str> {
        capabilities
            .into_iter()
            .filter(|name| self.is_allowed(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{agent_mode_id, plan_mode_id};
    use crate::registry::ModeRegistry;

    fn controller() -> ModeController {
        ModeController::new(ModeRegistry::builtin(), &agent_mode_id()).unwrap()
    }

    #[test]
    fn agent_mode_allows_everything() {
        let controller = controller();
        let gate = CapabilityGate::new(&controller);
        assert!(gate.is_allowed("write_file"));
        assert!(gate.is_allowed("read_file"));
        assert!(gate.is_allowed("run_command"));
    }

    #[test]
    fn plan_mode_denies_excluded_capabilities() {
        let mut controller = controller();
        controller.switch_to(&plan_mode_id()).unwrap();

        let gate = CapabilityGate::new(&controller);
        assert_eq!(
            gate.check("write_file"),
            GateDecision::DeniedByMode {
                mode: plan_mode_id()
            }
        );
        assert!(gate.is_allowed("read_file"));
    }

    #[test]
    fn gate_tracks_switches_without_caching() {
        let mut controller = controller();

        controller.switch_to(&plan_mode_id()).unwrap();
        assert!(!CapabilityGate::new(&controller).is_allowed("write_file"));

        controller.switch_to(&agent_mode_id()).unwrap();
        assert!(CapabilityGate::new(&controller).is_allowed("write_file"));
    }

    #[test]
    fn filter_available_retains_allowed_subset() {
        let mut controller = controller();
        controller.switch_to(&plan_mode_id()).unwrap();

        let gate = CapabilityGate::new(&controller);
        let available =
            gate.filter_available(["read_file", "write_file", "grep", "edit", "glob"]);
        assert_eq!(available, ["read_file", "grep", "glob"]);
    }
}
