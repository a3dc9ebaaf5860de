//! Helm CLI - line-oriented host shell for the mode-governance engine.
//!
//! The shell owns the outermost loop: lines starting with '/' are commands
//! (mode switching, stats, save/resume), anything else starts a new turn
//! and prints the instruction preamble that would accompany the outgoing
//! request. The model transport itself lives outside this binary.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use helm_config::HelmConfig;
use helm_engine::{CommandOutcome, Session, command_help_summary};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    if let Some((path, file)) = open_log_file() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        tracing::info!(path = %path.display(), "Logging initialized");
        return;
    }

    // If we can't open a log file, prefer "no logs" over interleaving them
    // with the interactive session on stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> Option<(PathBuf, fs::File)> {
    let config_dir = HelmConfig::path()?.parent()?.to_path_buf();
    let path = config_dir.join("logs").join("helm.log");
    fs::create_dir_all(path.parent()?).ok()?;
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;
    Some((path, file))
}

fn load_config() -> Option<HelmConfig> {
    match HelmConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Ignoring unreadable config at {}: {err}", err.path().display());
            None
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let config = load_config();
    let mut session = Session::new(config.as_ref())?;

    println!(
        "helm session {} · {} · {}",
        session.info().id(),
        session.current_mode().display_name(),
        command_help_summary()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('/') {
            match session.handle_command(line) {
                CommandOutcome::Message(message) => println!("{message}"),
                CommandOutcome::Quit => break,
                CommandOutcome::ResumeRequested(tag) => {
                    let data_dir = session.data_dir().to_path_buf();
                    match Session::resume_tagged(config.as_ref(), &data_dir, &tag) {
                        Ok(resumed) => {
                            session = resumed;
                            println!(
                                "Resumed '{tag}' in {} (prompt {}).",
                                session.current_mode().display_name(),
                                session.prompt_count()
                            );
                        }
                        Err(err) => println!("Resume failed: {err}"),
                    }
                }
            }
            continue;
        }

        // A user prompt: advance the turn and show what the engine injects
        // ahead of it. The actual model call belongs to the transport layer.
        let preamble = session.begin_turn();
        println!(
            "[turn {} · {}]",
            session.prompt_count(),
            session.current_mode().display_name()
        );
        for block in preamble {
            print!("{block}");
        }
        println!();
    }

    Ok(())
}
