//! Mode-scoped instruction rendering.
//!
//! The short reminder wraps the active mode's standing instruction in a
//! fixed `<system-reminder>` block and is re-delivered with every turn so
//! long conversations do not drift away from the mode's constraints. The
//! wrapping delimiters are constant regardless of mode, and downstream
//! consumers treat the block as environment-injected metadata - never as
//! user- or model-authored text.

use helm_types::OperatingMode;

const REMINDER_OPEN: &str = "<system-reminder>";
const REMINDER_CLOSE: &str = "</system-reminder>";

/// Render the per-turn reminder for a mode.
#[must_use]
pub fn render_reminder(mode: &OperatingMode) -> String {
    format!("\n{REMINDER_OPEN}{}{REMINDER_CLOSE}\n\n", mode.prompt())
}

/// The extended system-prompt block delivered once at mode entry, if the
/// mode carries one.
#[must_use]
pub fn mode_entry_context(mode: &OperatingMode) -> Option<&str> {
    mode.system_prompt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{agent_mode, plan_mode};

    #[test]
    fn reminder_wraps_exactly_the_mode_prompt() {
        let mode = plan_mode();
        let reminder = render_reminder(&mode);
        assert_eq!(
            reminder,
            format!("\n<system-reminder>{}</system-reminder>\n\n", mode.prompt())
        );
    }

    #[test]
    fn reminder_delimiters_are_mode_independent() {
        for mode in [agent_mode(), plan_mode()] {
            let reminder = render_reminder(&mode);
            assert!(reminder.starts_with("\n<system-reminder>"));
            assert!(reminder.ends_with("</system-reminder>\n\n"));
        }
    }

    #[test]
    fn reminder_flips_with_the_mode() {
        let agent = render_reminder(&agent_mode());
        let plan = render_reminder(&plan_mode());

        assert!(agent.contains("Agent Mode"));
        assert!(!agent.contains("Plan Mode"));
        assert!(plan.contains("Plan Mode"));
        assert!(!plan.contains("Agent Mode"));
    }

    #[test]
    fn entry_context_only_for_modes_with_system_prompt() {
        assert!(mode_entry_context(&agent_mode()).is_none());
        assert!(mode_entry_context(&plan_mode()).is_some());
    }
}
