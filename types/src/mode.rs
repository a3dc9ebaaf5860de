//! Operating-mode identity and definition.
//!
//! An operating mode is a named, mutually exclusive behavioral configuration:
//! it supplies a standing instruction that is re-asserted every turn, may
//! carry an extended system-prompt block delivered once at mode entry, and
//! may exclude capabilities from the agent's tool set while active.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier for an operating mode.
///
/// Identifiers are trimmed, lowercased, and must be non-empty with no
/// interior whitespace. Validation happens at construction, so a `ModeId`
/// held anywhere in the system is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModeId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidModeIdError {
    #[error("mode identifier must not be empty")]
    Empty,
    #[error("mode identifier must not contain whitespace (got {0:?})")]
    Whitespace(String),
}

impl ModeId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidModeIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidModeIdError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(InvalidModeIdError::Whitespace(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ModeId {
    type Error = InvalidModeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModeId> for String {
    fn from(value: ModeId) -> Self {
        value.0
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a capability the agent may attempt to invoke (e.g. a tool name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapabilityName(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("capability name must not be empty")]
pub struct InvalidCapabilityError;

impl CapabilityName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidCapabilityError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidCapabilityError);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CapabilityName {
    type Error = InvalidCapabilityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CapabilityName> for String {
    fn from(value: CapabilityName) -> Self {
        value.0
    }
}

// Lets `BTreeSet<CapabilityName>` be probed with a plain `&str`.
impl Borrow<str> for CapabilityName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable operating-mode definition.
///
/// The standing instruction (`prompt`) is re-delivered with every turn while
/// the mode is active; the extended `system_prompt` block, when present, is
/// delivered once at mode entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingMode {
    id: ModeId,
    display_name: String,
    prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    excluded_capabilities: BTreeSet<CapabilityName>,
}

impl OperatingMode {
    pub fn new(
        id: ModeId,
        display_name: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            prompt: prompt.into(),
            system_prompt: None,
            excluded_capabilities: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    #[must_use]
    pub fn with_excluded_capabilities(
        mut self,
        capabilities: impl IntoIterator<Item = CapabilityName>,
    ) -> Self {
        self.excluded_capabilities.extend(capabilities);
        self
    }

    #[must_use]
    pub fn id(&self) -> &ModeId {
        &self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    #[must_use]
    pub fn excluded_capabilities(&self) -> &BTreeSet<CapabilityName> {
        &self.excluded_capabilities
    }

    /// Whether this mode removes the named capability from the tool set.
    #[must_use]
    pub fn excludes(&self, capability: &str) -> bool {
        self.excluded_capabilities.contains(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_id_rejects_empty_and_whitespace() {
        assert!(matches!(ModeId::new(""), Err(InvalidModeIdError::Empty)));
        assert!(matches!(ModeId::new("   "), Err(InvalidModeIdError::Empty)));
        assert!(matches!(
            ModeId::new("plan mode"),
            Err(InvalidModeIdError::Whitespace(_))
        ));
    }

    #[test]
    fn mode_id_normalizes_case_and_trim() {
        let id = ModeId::new("  Plan  ").unwrap();
        assert_eq!(id.as_str(), "plan");
        assert_eq!(id, ModeId::new("PLAN").unwrap());
    }

    #[test]
    fn mode_id_serde_roundtrip() {
        let id = ModeId::new("agent").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"agent\"");
        let back: ModeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn capability_name_rejects_empty() {
        assert!(CapabilityName::new("").is_err());
        assert!(CapabilityName::new("  ").is_err());
        assert!(CapabilityName::new("write_file").is_ok());
    }

    #[test]
    fn operating_mode_excludes_lookup_by_str() {
        let mode = OperatingMode::new(
            ModeId::new("plan").unwrap(),
            "Plan Mode",
            "You are in Plan Mode.",
        )
        .with_excluded_capabilities([
            CapabilityName::new("write_file").unwrap(),
            CapabilityName::new("edit").unwrap(),
        ]);

        assert!(mode.excludes("write_file"));
        assert!(mode.excludes("edit"));
        assert!(!mode.excludes("read_file"));
    }

    #[test]
    fn operating_mode_builder_defaults() {
        let mode = OperatingMode::new(ModeId::new("agent").unwrap(), "Agent Mode", "prompt");
        assert!(mode.system_prompt().is_none());
        assert!(mode.excluded_capabilities().is_empty());
        assert!(!mode.excludes("anything"));
    }
}
