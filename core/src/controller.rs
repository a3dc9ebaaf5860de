//! Single-active-mode controller with synchronous change notification.

use std::fmt;

use helm_types::{ModeId, OperatingMode};

use crate::registry::{ModeError, ModeRegistry};

/// Notification payload delivered to observers on every switch.
///
/// `previous` equals the new mode's id when the switch re-selected the
/// already-active mode; observers still receive the event so they can
/// refresh derived views (e.g. the list of invokable capabilities).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeChanged {
    pub previous: ModeId,
    pub mode: OperatingMode,
}

impl ModeChanged {
    /// Whether the active mode actually changed identity.
    #[must_use]
    pub fn is_transition(&self) -> bool {
        &self.previous != self.mode.id()
    }
}

/// Handle for a registered observer, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Holds the single currently-active mode for a session.
///
/// The controller owns both the registry and the observer list; observer
/// callbacks should capture only weak handles to their own state so that a
/// dropped subscriber never keeps state alive through the controller.
/// Dispatch is synchronous and in registration order: every capability or
/// prompt query made after `switch_to` returns observes the new mode.
pub struct ModeController {
    registry: ModeRegistry,
    active: ModeId,
    observers: Vec<(ObserverId, Box<dyn FnMut(&ModeChanged)>)>,
    next_observer: u64,
}

impl fmt::Debug for ModeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeController")
            .field("active", &self.active)
            .field("modes", &self.registry.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ModeController {
    /// Create a controller with the given initial mode.
    ///
    /// Fails with `UnknownMode` when `initial` is not registered.
    pub fn new(registry: ModeRegistry, initial: &ModeId) -> Result<Self, ModeError> {
        registry.get(initial)?;
        Ok(Self {
            registry,
            active: initial.clone(),
            observers: Vec::new(),
            next_observer: 0,
        })
    }

    #[must_use]
    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    /// The currently-active mode.
    #[must_use]
    pub fn current(&self) -> &OperatingMode {
        self.registry
            .get(&self.active)
            .expect("active mode is always registered")
    }

    #[must_use]
    pub fn active_id(&self) -> &ModeId {
        &self.active
    }

    /// Switch the active mode.
    ///
    /// On `UnknownMode` the active mode is left unchanged and no
    /// notification is emitted. Switching to the already-active mode is a
    /// state no-op but still notifies observers before returning.
    pub fn switch_to(&mut self, id: &ModeId) -> Result<&OperatingMode, ModeError> {
        let mode = self.registry.get(id)?.clone();
        let previous = std::mem::replace(&mut self.active, mode.id().clone());

        tracing::debug!(from = %previous, to = %self.active, "mode switch");

        let event = ModeChanged { previous, mode };
        for (_, observer) in &mut self.observers {
            observer(&event);
        }

        Ok(self.current())
    }

    /// Register an observer; it is invoked synchronously on every switch,
    /// in registration order.
    pub fn subscribe(&mut self, observer: impl FnMut(&ModeChanged) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a previously registered observer. Returns `false` if the id
    /// was already gone.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }
}
