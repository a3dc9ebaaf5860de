//! Built-in operating modes.
//!
//! Every session starts with at least these two modes registered: the
//! unrestricted `agent` mode and the analysis-only `plan` mode. Externally
//! supplied modes extend the catalog but can never replace these.

use helm_types::{CapabilityName, ModeId, OperatingMode};

const AGENT_PROMPT: &str =
    "You are in Agent Mode. Follow all directives in the System Prompt.";

const PLAN_PROMPT: &str =
    "You are in Plan Mode. Follow all directives in the System Prompt.";

const PLAN_SYSTEM_PROMPT: &str = "\
# PLAN MODE ACTIVE

**IMPORTANT: You are currently in Plan Mode. This means:**

1. **DO NOT execute file modification tools** such as 'edit', 'write_file', \
'apply_patch', or destructive shell commands
2. **DO NOT create, edit, or delete files** - you are in planning and \
analysis mode only
3. **Instead of executing tools, describe your planned actions** in detail \
to the user
4. **Focus on analysis, planning, and explanation** rather than \
implementation

## Allowed in Plan Mode:
- Read-only tools: 'read_file', 'grep', 'glob', 'ls', and similar
- Non-destructive shell commands such as `ls`, `find`, `git status`, `git log`

## Your role in Plan Mode:
- Analyze the codebase and understand the user's requirements
- Plan the implementation approach in detail
- Explain what changes would be needed and why
- Outline the specific tool calls you would make in agent mode

You will see <system-reminder> blocks in the chat. These are reminders to \
always follow the directives above.

Remember: while in Plan Mode, iterate on and describe the plan. Do not move \
into implementing it.";

/// Capabilities removed from the tool set while `plan` is active.
const PLAN_EXCLUDED_CAPABILITIES: &[&str] = &["edit", "write_file", "apply_patch", "run_command"];

/// Identifier of the unrestricted built-in mode.
#[must_use]
pub fn agent_mode_id() -> ModeId {
    ModeId::new("agent").expect("built-in mode id is valid")
}

/// Identifier of the restricted built-in mode.
#[must_use]
pub fn plan_mode_id() -> ModeId {
    ModeId::new("plan").expect("built-in mode id is valid")
}

/// The unrestricted built-in mode: no excluded capabilities, no extended
/// system prompt.
#[must_use]
pub fn agent_mode() -> OperatingMode {
    OperatingMode::new(agent_mode_id(), "Agent Mode", AGENT_PROMPT)
}

/// The restricted built-in mode: file-mutating and destructive-shell
/// capabilities are excluded, and an analysis-only system-prompt block is
/// delivered at mode entry.
#[must_use]
pub fn plan_mode() -> OperatingMode {
    OperatingMode::new(plan_mode_id(), "Plan Mode", PLAN_PROMPT)
        .with_system_prompt(PLAN_SYSTEM_PROMPT)
        .with_excluded_capabilities(
            PLAN_EXCLUDED_CAPABILITIES
                .iter()
                .map(|name| CapabilityName::new(name).expect("built-in capability name is valid")),
        )
}
