//! Override bindings and relay change notification.
//!
//! A relay never calls into presentation code. It carries an optional
//! [`OverrideBinding`] naming the toggle that mirrors it, and every
//! successful write is published as a [`RelayChange`] to the subscribed
//! [`ChangeListener`]s. A toggle redraws itself when it sees a change
//! carrying its own [`ToggleId`]. Override writes carry no toggle, so the
//! toggle that made them is never asked to re-sync.

use antsw_common::relay::{RelayId, ToggleId};
use serde::Serialize;
use tracing::trace;

/// Association between one relay and one presentation-layer toggle.
///
/// Relation only: neither side owns the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverrideBinding {
    relay: RelayId,
    toggle: ToggleId,
}

impl OverrideBinding {
    /// Bind `toggle` to `relay`.
    pub const fn new(relay: RelayId, toggle: ToggleId) -> Self {
        Self { relay, toggle }
    }

    /// Bound relay.
    pub const fn relay(&self) -> RelayId {
        self.relay
    }

    /// Bound toggle.
    pub const fn toggle(&self) -> ToggleId {
        self.toggle
    }
}

/// One relay state change, published after a successful hardware write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelayChange {
    /// Relay that changed.
    pub relay: RelayId,
    /// New logical state.
    pub energized: bool,
    /// Toggle bound to the relay at the time of the write. `None` for
    /// unbound relays and for override writes.
    pub toggle: Option<ToggleId>,
}

impl RelayChange {
    /// Whether this change must be mirrored by `toggle`.
    pub fn concerns(&self, toggle: ToggleId) -> bool {
        self.toggle == Some(toggle)
    }
}

/// Receiver of relay change notifications.
pub trait ChangeListener {
    /// Called synchronously, once per relay write, in write order.
    fn on_change(&mut self, change: &RelayChange);
}

impl<F> ChangeListener for F
where
    F: FnMut(&RelayChange),
{
    fn on_change(&mut self, change: &RelayChange) {
        self(change)
    }
}

/// Fan-out of relay changes to every subscribed listener.
#[derive(Default)]
pub struct Notifier {
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl Notifier {
    /// Create a notifier with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Listeners live as long as the notifier.
    pub fn subscribe(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    /// Deliver `change` to every listener in subscription order.
    pub fn notify(&mut self, change: &RelayChange) {
        trace!(
            "Notifying {} listener(s): {} -> {}",
            self.listeners.len(),
            change.relay.key(),
            change.energized
        );
        for listener in &mut self.listeners {
            listener.on_change(change);
        }
    }

    /// Number of subscribed listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
