//! Session orchestration for Helm.
//!
//! This crate wires the mode governance and telemetry layers into a single
//! `Session`: one active mode, one telemetry stream, one identity. Hosts
//! drive it through the command surface (`handle_command`) and the turn
//! preamble, and report completed model/tool calls through the telemetry
//! pass-throughs.

use std::path::{Path, PathBuf};

use anyhow::Context;

use helm_core::{agent_mode_id, render_reminder};

mod commands;
mod persistence;

pub use commands::{Command, CommandOutcome, CommandSpec, command_help_summary, command_specs};
pub use persistence::{SavedSession, TagError};

// Re-export the pieces hosts interact with directly.
pub use helm_config::{ConfigError, HelmConfig};
pub use helm_core::{CapabilityGate, GateDecision, ModeController, ModeError, ModeRegistry};
pub use helm_telemetry::{
    ComputedSessionStats, SessionMetrics, SessionStatsView, TelemetryAggregator, TelemetryUpdate,
};
pub use helm_types::{
    ModeId, OperatingMode, SessionId, SessionInfo, TokenUsage, ToolOutcome, UsageDelta,
};

/// A single interactive session: active mode, telemetry, identity.
#[derive(Debug)]
pub struct Session {
    info: SessionInfo,
    controller: ModeController,
    telemetry: TelemetryAggregator,
    stats: SessionStatsView,
    default_mode: ModeId,
    /// Mode whose extended system prompt is still owed to the conversation.
    /// Taken by the next turn preamble.
    pending_mode_entry: Option<ModeId>,
    data_dir: PathBuf,
}

impl Session {
    /// Create a session from optional configuration.
    ///
    /// The registry starts with the built-in modes; `[[modes]]` entries from
    /// config are appended after them. An entry that collides with an
    /// already-registered identifier is fatal; an entry that fails
    /// validation is skipped with a warning. The initial mode comes from
    /// `[app] default_mode` when it names a registered mode, otherwise the
    /// unrestricted built-in.
    pub fn new(config: Option<&HelmConfig>) -> anyhow::Result<Self> {
        let mut registry = ModeRegistry::builtin();
        if let Some(config) = config {
            for definition in &config.modes {
                match definition.to_operating_mode() {
                    Ok(mode) => {
                        registry.register(mode).with_context(|| {
                            format!("config [[modes]] entry '{}'", definition.name)
                        })?;
                    }
                    Err(err) => {
                        tracing::warn!(
                            "Skipping invalid [[modes]] entry '{}': {err}",
                            definition.name
                        );
                    }
                }
            }
        }

        let default_mode = config
            .and_then(|cfg| cfg.app.as_ref())
            .and_then(|app| app.default_mode.as_deref())
            .and_then(|raw| match ModeId::new(raw) {
                Ok(id) if registry.contains(&id) => Some(id),
                Ok(id) => {
                    tracing::warn!("Unknown default_mode in config: {id}");
                    None
                }
                Err(err) => {
                    tracing::warn!("Invalid default_mode in config: {err}");
                    None
                }
            })
            .unwrap_or_else(agent_mode_id);

        let controller = ModeController::new(registry, &default_mode)
            .context("initial mode must be registered")?;

        let mut telemetry = TelemetryAggregator::new();
        let stats = SessionStatsView::subscribed(&mut telemetry);

        let pending_mode_entry = controller
            .current()
            .system_prompt()
            .is_some()
            .then(|| default_mode.clone());

        Ok(Self {
            info: SessionInfo::start(),
            controller,
            telemetry,
            stats,
            default_mode,
            pending_mode_entry,
            data_dir: default_data_dir(),
        })
    }

    /// Override the data directory used for saved session tags.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    // ========================================================================
    // Identity & mode queries
    // ========================================================================

    #[must_use]
    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    #[must_use]
    pub fn current_mode(&self) -> &OperatingMode {
        self.controller.current()
    }

    #[must_use]
    pub fn active_mode_id(&self) -> &ModeId {
        self.controller.active_id()
    }

    /// All registered modes in registration order.
    pub fn modes(&self) -> impl Iterator<Item = &OperatingMode> {
        self.controller.registry().iter()
    }

    #[must_use]
    pub fn controller_mut(&mut self) -> &mut ModeController {
        &mut self.controller
    }

    // ========================================================================
    // Mode switching
    // ========================================================================

    /// Switch the active mode, returning the user-visible confirmation.
    ///
    /// An unknown identifier leaves the session unchanged. A transition into
    /// a mode that carries an extended system prompt schedules that block
    /// for the next turn preamble; re-selecting the active mode does not
    /// re-deliver it.
    pub fn switch_mode(&mut self, id: &ModeId) -> Result<String, ModeError> {
        let previous = self.controller.active_id().clone();
        let (entered, display_name, has_system_prompt) = {
            let mode = self.controller.switch_to(id)?;
            (
                mode.id().clone(),
                mode.display_name().to_string(),
                mode.system_prompt().is_some(),
            )
        };

        if entered != previous {
            self.pending_mode_entry = has_system_prompt.then_some(entered);
        }

        Ok(format!("Switched to {display_name}."))
    }

    // ========================================================================
    // Capability gating
    // ========================================================================

    /// The per-call capability gate over the active mode.
    #[must_use]
    pub fn gate(&self) -> CapabilityGate<'_> {
        CapabilityGate::new(&self.controller)
    }

    /// Check one candidate capability against the active mode.
    #[must_use]
    pub fn check_capability(&self, capability: &str) -> GateDecision {
        self.gate().check(capability)
    }

    /// The currently invokable subset of `capabilities`, for host UI refresh
    /// after a switch.
    pub fn available_capabilities<'n>(
        &self,
        capabilities: impl IntoIterator<Item = &'n str>,
    ) -> Vec<&'n str> {
        self.gate().filter_available(capabilities)
    }

    /// Model-visible text for a capability the active mode excludes.
    ///
    /// Denial is "not available in this mode", never a runtime failure, and
    /// produces no tool-invocation telemetry (the tool never ran).
    #[must_use]
    pub fn capability_unavailable_message(&self, capability: &str) -> String {
        format!(
            "Tool '{capability}' is not available in {}.",
            self.current_mode().display_name()
        )
    }

    // ========================================================================
    // Turn preamble
    // ========================================================================

    /// Begin a new user turn: bump the prompt ordinal and assemble the
    /// preamble for the outgoing request.
    pub fn begin_turn(&mut self) -> Vec<String> {
        self.stats.start_new_prompt();
        self.turn_preamble()
    }

    /// The instruction blocks injected ahead of the next request: the
    /// pending mode-entry system prompt (at most once per entry) followed by
    /// the per-turn reminder for the active mode.
    pub fn turn_preamble(&mut self) -> Vec<String> {
        let mut parts = Vec::new();

        if let Some(pending) = self.pending_mode_entry.take()
            && &pending == self.controller.active_id()
            && let Some(system_prompt) = self.controller.current().system_prompt()
        {
            parts.push(system_prompt.to_string());
        }

        parts.push(render_reminder(self.controller.current()));
        parts
    }

    // ========================================================================
    // Telemetry
    // ========================================================================

    /// Report one completed model call.
    pub fn record_model_usage(&mut self, model_id: &str, usage: TokenUsage, duration_ms: u64) {
        self.telemetry.record_model_usage(model_id, usage, duration_ms);
    }

    /// Report one completed tool call. Cancelled calls are reported as
    /// failures by the transport layer, never dropped.
    pub fn record_tool_invocation(
        &mut self,
        tool_name: &str,
        outcome: ToolOutcome,
        duration_ms: u64,
    ) {
        self.telemetry
            .record_tool_invocation(tool_name, outcome, duration_ms);
    }

    /// Report one decision on a proposed action.
    pub fn record_decision(&mut self, agreed: bool) {
        self.telemetry.record_decision(agreed);
    }

    /// Report line counts from one file-modifying tool call.
    pub fn record_edit(&mut self, lines_added: u64, lines_removed: u64) {
        self.telemetry.record_edit(lines_added, lines_removed);
    }

    /// Snapshot of cumulative telemetry.
    #[must_use]
    pub fn metrics(&self) -> SessionMetrics {
        self.telemetry.metrics()
    }

    /// Derived statistics, recomputed from the latest snapshot.
    #[must_use]
    pub fn computed_stats(&self) -> ComputedSessionStats {
        self.stats.computed()
    }

    #[must_use]
    pub fn last_prompt_token_count(&self) -> u64 {
        self.telemetry.last_prompt_token_count()
    }

    #[must_use]
    pub fn prompt_count(&self) -> u64 {
        self.stats.prompt_count()
    }

    /// Display-only refresh of the last-turn token fields. Must not be
    /// combined with [`Session::record_model_usage`] for the same call.
    pub fn add_usage(&mut self, delta: UsageDelta) {
        self.stats.add_usage(delta);
    }

    #[must_use]
    pub fn stats_view(&self) -> &SessionStatsView {
        &self.stats
    }

    // ========================================================================
    // Saved session tags
    // ========================================================================

    /// Save this session under a user-chosen tag.
    ///
    /// The document records the prompt ordinal and, only when the user had
    /// switched away from the default, the active mode id. Telemetry is not
    /// persisted: a resumed session always starts with zeroed counters.
    pub fn save_tagged(&self, tag: &str) -> anyhow::Result<PathBuf> {
        let mode = (self.controller.active_id() != &self.default_mode)
            .then(|| self.controller.active_id().clone());
        let document = SavedSession::capture(tag, self.stats.prompt_count(), mode)?;
        persistence::write_session(&self.data_dir, &document)
    }

    /// Construct a fresh session re-initialized against a saved tag.
    ///
    /// Telemetry starts zeroed. The mode is reset to the default unless the
    /// saved document explicitly asserts a prior mode that is still
    /// registered. A document with an incompatible schema version is
    /// ignored with a warning.
    pub fn resume_tagged(
        config: Option<&HelmConfig>,
        data_dir: &Path,
        tag: &str,
    ) -> anyhow::Result<Self> {
        let mut session = Self::new(config)?.with_data_dir(data_dir);

        let Some(saved) = persistence::read_session(data_dir, tag)? else {
            anyhow::bail!("no saved session with tag '{tag}'");
        };
        if !saved.is_compatible() {
            tracing::warn!(
                "Ignoring saved session '{tag}': schema version {} is not supported",
                saved.version
            );
            return Ok(session);
        }

        session.stats.restore_prompt_count(saved.prompt_count);
        if let Some(mode) = saved.mode {
            match session.switch_mode(&mode) {
                Ok(_) => {}
                Err(err) => tracing::warn!("Saved session '{tag}' asserts {err}; using default"),
            }
        }

        Ok(session)
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Base data directory for saved sessions.
fn default_data_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(path) => path.join("helm"),
        None => {
            tracing::warn!("No system data directory; using ./helm");
            PathBuf::from(".").join("helm")
        }
    }
}
