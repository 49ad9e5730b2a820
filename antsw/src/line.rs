//! A single relay coil behind one output pin.
//!
//! The cached state is the single source of truth: pins are never read
//! back, and the cache only moves after the driver reports a successful
//! write.

use antsw_common::hal::driver::{HalError, PinDriver};
use antsw_common::relay::{PinRef, RelayId};
use tracing::debug;

use crate::binding::{Notifier, OverrideBinding, RelayChange};

/// One managed relay.
#[derive(Debug)]
pub struct RelayLine {
    relay: RelayId,
    pin: PinRef,
    active_low: bool,
    state: bool,
    binding: Option<OverrideBinding>,
}

impl RelayLine {
    /// Claim `pin` as an output and drive it to `initial`.
    ///
    /// # Errors
    /// Returns `HalError::HardwareInit` if the pin cannot be configured or
    /// the first write fails.
    pub fn create(
        relay: RelayId,
        pin: PinRef,
        active_low: bool,
        initial: bool,
        driver: &mut dyn PinDriver,
    ) -> Result<Self, HalError> {
        driver.configure_output(pin)?;

        let mut line = Self {
            relay,
            pin,
            active_low,
            state: initial,
            binding: None,
        };
        line.write_only(initial, driver).map_err(|e| HalError::HardwareInit {
            pin,
            reason: format!("initial write failed: {e}"),
        })?;

        debug!(
            "Relay {} on {} initialized to {}",
            relay.key(),
            pin,
            relay.position_name(initial)
        );
        Ok(line)
    }

    /// Write `state` to hardware and update the cache. Bound toggles are
    /// not notified; this is the path a toggle uses to drive its own relay.
    ///
    /// # Errors
    /// Returns `HalError::HardwarePin` and leaves the cache unchanged if
    /// the write fails.
    pub fn write_only(&mut self, state: bool, driver: &mut dyn PinDriver) -> Result<(), HalError> {
        driver.write_pin(self.pin, state != self.active_low)?;
        self.state = state;
        Ok(())
    }

    /// Write `state`, then publish the change so a bound toggle resyncs.
    ///
    /// Nothing is published if the write fails.
    pub fn write(
        &mut self,
        state: bool,
        driver: &mut dyn PinDriver,
        notifier: &mut Notifier,
    ) -> Result<(), HalError> {
        self.write_only(state, driver)?;
        debug!(
            "Relay {} -> {}",
            self.relay.key(),
            self.relay.position_name(state)
        );
        notifier.notify(&RelayChange {
            relay: self.relay,
            energized: state,
            toggle: self.binding.map(|b| b.toggle()),
        });
        Ok(())
    }

    /// Attach `binding`, returning the one it replaces.
    pub fn attach_override(&mut self, binding: OverrideBinding) -> Option<OverrideBinding> {
        self.binding.replace(binding)
    }

    /// Cached logical state. Never queries hardware.
    pub fn current_state(&self) -> bool {
        self.state
    }

    /// Relay identity.
    pub fn relay(&self) -> RelayId {
        self.relay
    }

    /// Output pin.
    pub fn pin(&self) -> PinRef {
        self.pin
    }

    /// Current binding, if any.
    pub fn binding(&self) -> Option<OverrideBinding> {
        self.binding
    }
}
