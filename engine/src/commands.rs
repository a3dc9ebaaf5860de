//! Command processing for the session.
//!
//! This module handles slash commands like /mode, /stats, /save, /resume.

use helm_types::ModeId;

use crate::Session;

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub palette_label: &'static str,
    pub help_label: &'static str,
    pub description: &'static str,
    pub show_in_help: bool,
}

const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        palette_label: "mode <name>",
        help_label: "mode",
        description: "Switch between operating modes (agent/plan)",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "stats",
        help_label: "stats",
        description: "Show session statistics",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "save <tag>",
        help_label: "save",
        description: "Save this session under a tag",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "resume <tag>",
        help_label: "resume",
        description: "Resume a previously saved session",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "q, quit",
        help_label: "q(uit)",
        description: "Exit the application",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "help",
        help_label: "help",
        description: "Show available commands",
        show_in_help: false,
    },
];

#[must_use]
pub fn command_specs() -> &'static [CommandSpec] {
    COMMAND_SPECS
}

#[must_use]
pub fn command_help_summary() -> String {
    let labels: Vec<&str> = COMMAND_SPECS
        .iter()
        .filter(|spec| spec.show_in_help)
        .map(|spec| spec.help_label)
        .collect();
    format!("Commands: /{}", labels.join(", /"))
}

/// Parsed command with typed arguments.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Mode(Option<&'a str>),
    Stats,
    Save(Option<&'a str>),
    Resume(Option<&'a str>),
    Help,
    Quit,
    Unknown(&'a str),
    Empty,
}

impl<'a> Command<'a> {
    /// Parse a raw command line (leading '/' optional) into a typed Command.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        let raw = raw.trim().strip_prefix('/').unwrap_or(raw.trim());
        let parts: Vec<&str> = raw.split_whitespace().collect();

        match parts.first().copied() {
            Some("mode") => Command::Mode(parts.get(1).copied()),
            Some("stats") => Command::Stats,
            Some("save") => Command::Save(parts.get(1).copied()),
            Some("resume") => Command::Resume(parts.get(1).copied()),
            Some("help") => Command::Help,
            Some("q" | "quit") => Command::Quit,
            Some(cmd) => Command::Unknown(cmd),
            None => Command::Empty,
        }
    }
}

/// What the host should do after a command was handled.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Show this text to the user.
    Message(String),
    /// Replace the current session by resuming the named tag.
    ResumeRequested(String),
    Quit,
}

impl Session {
    /// Handle one entered command line.
    pub fn handle_command(&mut self, raw: &str) -> CommandOutcome {
        match Command::parse(raw) {
            Command::Quit => CommandOutcome::Quit,
            Command::Help | Command::Empty => CommandOutcome::Message(command_help_summary()),
            Command::Mode(None) => CommandOutcome::Message(self.format_mode_list()),
            Command::Mode(Some(raw_id)) => self.handle_mode_switch(raw_id),
            Command::Stats => CommandOutcome::Message(self.format_stats()),
            Command::Save(None) => CommandOutcome::Message("Usage: /save <tag>".to_string()),
            Command::Save(Some(tag)) => match self.save_tagged(tag) {
                Ok(path) => CommandOutcome::Message(format!(
                    "Saved session as '{tag}' ({}).",
                    path.display()
                )),
                Err(err) => CommandOutcome::Message(format!("Save failed: {err}")),
            },
            Command::Resume(None) => CommandOutcome::Message("Usage: /resume <tag>".to_string()),
            Command::Resume(Some(tag)) => CommandOutcome::ResumeRequested(tag.to_string()),
            Command::Unknown(cmd) => CommandOutcome::Message(format!(
                "Unknown command: /{cmd}. {}",
                command_help_summary()
            )),
        }
    }

    fn handle_mode_switch(&mut self, raw_id: &str) -> CommandOutcome {
        let id = match ModeId::new(raw_id) {
            Ok(id) => id,
            Err(err) => return CommandOutcome::Message(format!("Invalid mode: {err}")),
        };

        match self.switch_mode(&id) {
            Ok(confirmation) => CommandOutcome::Message(confirmation),
            Err(err) => CommandOutcome::Message(format!("{err}. {}", self.format_mode_list())),
        }
    }

    fn format_mode_list(&self) -> String {
        let entries: Vec<String> = self
            .modes()
            .map(|mode| {
                if mode.id() == self.active_mode_id() {
                    format!("{} (active)", mode.id())
                } else {
                    mode.id().to_string()
                }
            })
            .collect();
        format!("Modes: {}", entries.join(", "))
    }

    fn format_stats(&self) -> String {
        let stats = self.computed_stats();
        let last_prompt = self.last_prompt_token_count();

        let mut lines = vec![format!(
            "Session {} · started {}",
            self.info().id(),
            self.info().started_at().format("%Y-%m-%d %H:%M:%S UTC")
        )];
        lines.push(format!(
            "Prompts {} · Tokens {} in / last turn {} in ({:.0}% cached)",
            self.prompt_count(),
            format_token_count(stats.total_prompt_tokens),
            format_token_count(last_prompt),
            stats.cache_efficiency * 100.0
        ));
        lines.push(format!(
            "Active {}ms · API {}ms ({:.0}%) · Tools {}ms ({:.0}%)",
            stats.agent_active_time_ms,
            stats.total_api_time_ms,
            stats.api_time_percent,
            stats.total_tool_time_ms,
            stats.tool_time_percent
        ));
        lines.push(format!(
            "Tool success {:.0}% · Agreement {:.0}% ({} decisions) · +{}/-{} lines",
            stats.success_rate * 100.0,
            stats.agreement_rate * 100.0,
            stats.total_decisions,
            stats.total_lines_added,
            stats.total_lines_removed
        ));
        lines.join("\n")
    }
}

fn format_token_count(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1000 {
        format!("{:.1}k", value as f64 / 1000.0)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_commands() {
        assert_eq!(Command::parse("/mode plan"), Command::Mode(Some("plan")));
        assert_eq!(Command::parse("mode"), Command::Mode(None));
        assert_eq!(Command::parse("/stats"), Command::Stats);
        assert_eq!(Command::parse("/save work"), Command::Save(Some("work")));
        assert_eq!(Command::parse("resume work"), Command::Resume(Some("work")));
        assert_eq!(Command::parse("/q"), Command::Quit);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/bogus"), Command::Unknown("bogus"));
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn mode_command_switches_and_confirms() {
        let mut session = Session::new(None).unwrap();
        let outcome = session.handle_command("/mode plan");
        assert_eq!(
            outcome,
            CommandOutcome::Message("Switched to Plan Mode.".to_string())
        );
        assert_eq!(session.active_mode_id().as_str(), "plan");
    }

    #[test]
    fn unknown_mode_is_rejected_with_listing() {
        let mut session = Session::new(None).unwrap();
        let CommandOutcome::Message(message) = session.handle_command("/mode debug") else {
            panic!("expected message outcome");
        };
        assert!(message.contains("unknown mode 'debug'"));
        assert!(message.contains("agent (active)"));
        assert_eq!(session.active_mode_id().as_str(), "agent");
    }

    #[test]
    fn mode_listing_marks_active() {
        let mut session = Session::new(None).unwrap();
        session.handle_command("/mode plan");
        let CommandOutcome::Message(message) = session.handle_command("/mode") else {
            panic!("expected message outcome");
        };
        assert_eq!(message, "Modes: agent, plan (active)");
    }

    #[test]
    fn stats_command_reports_counters() {
        let mut session = Session::new(None).unwrap();
        session.record_model_usage(
            "model-a",
            helm_types::TokenUsage {
                prompt_tokens: 1200,
                candidates_tokens: 300,
                total_tokens: 1500,
                cached_tokens: 600,
            },
            250,
        );

        let CommandOutcome::Message(message) = session.handle_command("/stats") else {
            panic!("expected message outcome");
        };
        assert!(message.contains("1.2k in"));
        assert!(message.contains("50% cached"));
        assert!(message.contains("API 250ms"));
    }

    #[test]
    fn resume_is_delegated_to_the_host() {
        let mut session = Session::new(None).unwrap();
        assert_eq!(
            session.handle_command("/resume work"),
            CommandOutcome::ResumeRequested("work".to_string())
        );
    }

    #[test]
    fn quit_and_help() {
        let mut session = Session::new(None).unwrap();
        assert_eq!(session.handle_command("/quit"), CommandOutcome::Quit);
        let CommandOutcome::Message(help) = session.handle_command("/help") else {
            panic!("expected message outcome");
        };
        assert!(help.starts_with("Commands: /"));
        assert!(help.contains("/mode"));
    }

    #[test]
    fn token_count_formatting() {
        assert_eq!(format_token_count(999), "999");
        assert_eq!(format_token_count(1_200), "1.2k");
        assert_eq!(format_token_count(2_500_000), "2.5M");
    }
}
