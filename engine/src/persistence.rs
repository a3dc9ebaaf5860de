//! Saved session tags.
//!
//! A session can be saved under a user-chosen tag and resumed later. The
//! persisted document is deliberately small: it re-asserts the prompt
//! ordinal and (only when the user had switched modes) the active mode id.
//! Telemetry is never persisted - a resumed session starts with zeroed
//! counters by design.
//!
//! # Version Compatibility
//!
//! The `version` field gates forward compatibility: documents written by a
//! newer schema are ignored and the session starts fresh.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use helm_types::ModeId;

/// Subdirectory of the data dir holding tagged session documents.
const SESSIONS_DIR: &str = "sessions";

/// Errors from user-supplied tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("session tag must not be empty")]
    Empty,
    #[error("session tag may only contain letters, digits, '-' and '_' (got {0:?})")]
    InvalidCharacter(String),
}

/// Validate a user-chosen session tag.
///
/// Tags become file names, so only a conservative character set is allowed.
pub fn validate_tag(tag: &str) -> Result<&str, TagError> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(TagError::Empty);
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(TagError::InvalidCharacter(trimmed.to_string()));
    }
    Ok(trimmed)
}

/// Persisted form of a tagged session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub tag: String,
    pub saved_at: DateTime<Utc>,
    /// Prompt ordinal at save time, restored for display continuity.
    pub prompt_count: u64,
    /// Active mode at save time; absent when the session was still in the
    /// default mode, in which case resume uses the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeId>,
}

impl SavedSession {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Capture a document for the given tag.
    pub fn capture(tag: &str, prompt_count: u64, mode: Option<ModeId>) -> Result<Self, TagError> {
        let tag = validate_tag(tag)?;
        Ok(Self {
            version: Self::CURRENT_VERSION,
            tag: tag.to_string(),
            saved_at: Utc::now(),
            prompt_count,
            mode,
        })
    }

    /// Whether this document was written by a schema we understand.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.version <= Self::CURRENT_VERSION
    }
}

fn session_file(data_dir: &Path, tag: &str) -> Result<PathBuf, TagError> {
    let tag = validate_tag(tag)?;
    Ok(data_dir.join(SESSIONS_DIR).join(format!("{tag}.json")))
}

/// Write a session document, creating the sessions directory if needed.
pub fn write_session(data_dir: &Path, document: &SavedSession) -> anyhow::Result<PathBuf> {
    let path = session_file(data_dir, &document.tag)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

    tracing::info!(tag = %document.tag, path = %path.display(), "session saved");
    Ok(path)
}

/// Read a session document by tag. `Ok(None)` when no such tag was saved.
pub fn read_session(data_dir: &Path, tag: &str) -> anyhow::Result<Option<SavedSession>> {
    let path = session_file(data_dir, tag)?;
    if !path.exists() {
        return Ok(None);
    }

    let content =
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let document: SavedSession = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(document))
}
