//! Configuration for Helm.
//!
//! Loaded from `~/.helm/config.toml`. Configuration supplies session
//! defaults and externally defined operating modes; built-in modes are
//! compiled in and cannot be redefined here.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use helm_types::{CapabilityName, ModeId, OperatingMode};

/// Top-level configuration document.
///
/// ```toml
/// [app]
/// default_mode = "plan"
///
/// [[modes]]
/// name = "review"
/// display_name = "Review Mode"
/// prompt = "You are in Review Mode. Comment, do not change."
/// exclude_capabilities = ["write_file", "edit"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct HelmConfig {
    pub app: Option<AppConfig>,
    /// Externally supplied operating modes, registered after the built-ins.
    #[serde(default)]
    pub modes: Vec<ModeDefinitionConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Identifier of the mode to activate at session start. Falls back to
    /// the unrestricted built-in when absent or unknown.
    pub default_mode: Option<String>,
}

/// A single `[[modes]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ModeDefinitionConfig {
    pub name: String,
    pub display_name: Option<String>,
    pub prompt: String,
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub exclude_capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeConfigError {
    #[error("invalid mode name: {0}")]
    InvalidName(#[from] helm_types::InvalidModeIdError),
    #[error("mode '{name}' has an empty prompt")]
    EmptyPrompt { name: String },
    #[error("mode '{name}' lists an empty capability name")]
    EmptyCapability { name: String },
}

impl ModeDefinitionConfig {
    /// Convert this entry to an [`OperatingMode`], validating as it goes.
    pub fn to_operating_mode(&self) -> Result<OperatingMode, ModeConfigError> {
        let id = ModeId::new(&self.name)?;
        if self.prompt.trim().is_empty() {
            return Err(ModeConfigError::EmptyPrompt {
                name: self.name.clone(),
            });
        }

        let display_name = self
            .display_name
            .clone()
            .unwrap_or_else(|| self.name.clone());

        let mut excluded = Vec::with_capacity(self.exclude_capabilities.len());
        for raw in &self.exclude_capabilities {
            let capability =
                CapabilityName::new(raw).map_err(|_| ModeConfigError::EmptyCapability {
                    name: self.name.clone(),
                })?;
            excluded.push(capability);
        }

        let mut mode = OperatingMode::new(id, display_name, self.prompt.trim())
            .with_excluded_capabilities(excluded);
        if let Some(system_prompt) = self.system_prompt.as_deref()
            && !system_prompt.trim().is_empty()
        {
            mode = mode.with_system_prompt(system_prompt);
        }
        Ok(mode)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl HelmConfig {
    /// Load the config file if one exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".helm").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config: HelmConfig = toml::from_str("").unwrap();
        assert!(config.app.is_none());
        assert!(config.modes.is_empty());
    }

    #[test]
    fn parse_app_config() {
        let toml_str = r#"
[app]
default_mode = "plan"
"#;
        let config: HelmConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.app.unwrap().default_mode,
            Some("plan".to_string())
        );
    }

    #[test]
    fn parse_mode_definitions() {
        let toml_str = r#"
[[modes]]
name = "review"
display_name = "Review Mode"
prompt = "You are in Review Mode. Comment, do not change."
exclude_capabilities = ["write_file", "edit"]

[[modes]]
name = "debug"
prompt = "You are in Debug Mode."
"#;
        let config: HelmConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.modes.len(), 2);
        assert_eq!(config.modes[0].name, "review");
        assert_eq!(
            config.modes[0].exclude_capabilities,
            vec!["write_file", "edit"]
        );
        assert!(config.modes[1].exclude_capabilities.is_empty());
    }

    #[test]
    fn mode_definition_converts_to_operating_mode() {
        let def = ModeDefinitionConfig {
            name: "Review".to_string(),
            display_name: Some("Review Mode".to_string()),
            prompt: "You are in Review Mode.".to_string(),
            system_prompt: Some("# REVIEW MODE".to_string()),
            exclude_capabilities: vec!["write_file".to_string()],
        };

        let mode = def.to_operating_mode().unwrap();
        assert_eq!(mode.id().as_str(), "review");
        assert_eq!(mode.display_name(), "Review Mode");
        assert!(mode.excludes("write_file"));
        assert_eq!(mode.system_prompt(), Some("# REVIEW MODE"));
    }

    #[test]
    fn mode_definition_defaults_display_name_to_name() {
        let def = ModeDefinitionConfig {
            name: "debug".to_string(),
            display_name: None,
            prompt: "You are in Debug Mode.".to_string(),
            system_prompt: None,
            exclude_capabilities: Vec::new(),
        };

        let mode = def.to_operating_mode().unwrap();
        assert_eq!(mode.display_name(), "debug");
        assert!(mode.system_prompt().is_none());
    }

    #[test]
    fn mode_definition_rejects_empty_name_and_prompt() {
        let empty_name = ModeDefinitionConfig {
            name: "  ".to_string(),
            display_name: None,
            prompt: "prompt".to_string(),
            system_prompt: None,
            exclude_capabilities: Vec::new(),
        };
        assert!(matches!(
            empty_name.to_operating_mode(),
            Err(ModeConfigError::InvalidName(_))
        ));

        let empty_prompt = ModeDefinitionConfig {
            name: "review".to_string(),
            display_name: None,
            prompt: "   ".to_string(),
            system_prompt: None,
            exclude_capabilities: Vec::new(),
        };
        assert!(matches!(
            empty_prompt.to_operating_mode(),
            Err(ModeConfigError::EmptyPrompt { .. })
        ));
    }

    #[test]
    fn mode_definition_rejects_empty_capability() {
        let def = ModeDefinitionConfig {
            name: "review".to_string(),
            display_name: None,
            prompt: "prompt".to_string(),
            system_prompt: None,
            exclude_capabilities: vec![String::new()],
        };
        assert!(matches!(
            def.to_operating_mode(),
            Err(ModeConfigError::EmptyCapability { .. })
        ));
    }

    #[test]
    fn blank_system_prompt_is_dropped() {
        let def = ModeDefinitionConfig {
            name: "review".to_string(),
            display_name: None,
            prompt: "prompt".to_string(),
            system_prompt: Some("   ".to_string()),
            exclude_capabilities: Vec::new(),
        };
        let mode = def.to_operating_mode().unwrap();
        assert!(mode.system_prompt().is_none());
    }
}
