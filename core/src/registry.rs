//! Immutable catalog of available operating modes.

use std::collections::HashMap;

use thiserror::Error;

use helm_types::{ModeId, OperatingMode};

use crate::builtin::{agent_mode, plan_mode};

/// Errors from mode lookup and registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    /// A switch or lookup referenced an identifier that was never registered.
    /// Session state is unchanged.
    #[error("unknown mode '{id}'")]
    UnknownMode { id: ModeId },
    /// Registration-time collision. Fatal at startup when a built-in is
    /// involved.
    #[error("mode '{id}' is already registered")]
    DuplicateMode { id: ModeId },
}

/// Mapping from identifier to mode definition, built once at startup and
/// read-only thereafter.
///
/// Iteration order is registration order: built-ins first, then any
/// externally supplied modes.
#[derive(Debug, Clone, Default)]
pub struct ModeRegistry {
    modes: Vec<OperatingMode>,
    index: HashMap<ModeId, usize>,
}

impl ModeRegistry {
    /// An empty registry. Most callers want [`ModeRegistry::builtin`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog: the unrestricted `agent` mode followed by the
    /// restricted `plan` mode.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(agent_mode())
            .expect("built-in agent mode registers into an empty registry");
        registry
            .register(plan_mode())
            .expect("built-in plan mode does not collide with agent");
        registry
    }

    /// Register a mode, failing on identifier collision.
    pub fn register(&mut self, mode: OperatingMode) -> Result<(), ModeError> {
        if self.index.contains_key(mode.id()) {
            return Err(ModeError::DuplicateMode {
                id: mode.id().clone(),
            });
        }
        self.index.insert(mode.id().clone(), self.modes.len());
        self.modes.push(mode);
        Ok(())
    }

    /// Look up a mode by identifier.
    pub fn get(&self, id: &ModeId) -> Result<&OperatingMode, ModeError> {
        self.index
            .get(id)
            .map(|&slot| &self.modes[slot])
            .ok_or_else(|| ModeError::UnknownMode { id: id.clone() })
    }

    #[must_use]
    pub fn contains(&self, id: &ModeId) -> bool {
        self.index.contains_key(id)
    }

    /// All registered modes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &OperatingMode> {
        self.modes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl<'a> IntoIterator for &'a ModeRegistry {
    type Item = &'a OperatingMode;
    type IntoIter = std::slice::Iter<'a, OperatingMode>;

    fn into_iter(self) -> Self::IntoIter {
        self.modes.iter()
    }
}
