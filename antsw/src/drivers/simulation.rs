//! Simulation driver.
//!
//! In-memory pins for development and testing without a relay board.
//! A cloneable [`SimulationProbe`] shares the pin state with the driver so
//! tests can inspect levels and inject faults after the driver has been
//! handed to the engine.

use antsw_common::hal::driver::{HalError, PinDriver};
use antsw_common::relay::PinRef;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Shared simulated pin bank.
#[derive(Debug, Default)]
struct SimulatedPins {
    /// Claimed pins and their last written level (None until first write)
    claimed: BTreeMap<PinRef, Option<bool>>,
    /// Every successful write, in order
    writes: Vec<(PinRef, bool)>,
    /// Number of `release_all` calls
    releases: u32,
    /// Pins whose configuration fails
    fail_configure: HashSet<PinRef>,
    /// Pins whose writes fail
    fail_writes: HashSet<PinRef>,
}

/// Inspection and fault-injection handle for a [`SimulationDriver`].
#[derive(Debug, Clone, Default)]
pub struct SimulationProbe {
    pins: Arc<Mutex<SimulatedPins>>,
}

impl SimulationProbe {
    /// Last level written to `pin`, `None` if unclaimed or never written.
    pub fn level(&self, pin: PinRef) -> Option<bool> {
        self.pins.lock().claimed.get(&pin).copied().flatten()
    }

    /// Whether `pin` is currently claimed.
    pub fn is_claimed(&self, pin: PinRef) -> bool {
        self.pins.lock().claimed.contains_key(&pin)
    }

    /// Currently claimed pins, ascending.
    pub fn claimed_pins(&self) -> Vec<PinRef> {
        self.pins.lock().claimed.keys().copied().collect()
    }

    /// Successful writes in order.
    pub fn writes(&self) -> Vec<(PinRef, bool)> {
        self.pins.lock().writes.clone()
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.pins.lock().writes.len()
    }

    /// Forget the write history.
    pub fn clear_writes(&self) {
        self.pins.lock().writes.clear();
    }

    /// Number of `release_all` calls seen.
    pub fn release_count(&self) -> u32 {
        self.pins.lock().releases
    }

    /// Make configuring `pin` fail.
    pub fn fail_configure(&self, pin: PinRef) {
        self.pins.lock().fail_configure.insert(pin);
    }

    /// Make every write to `pin` fail.
    pub fn fail_writes(&self, pin: PinRef) {
        self.pins.lock().fail_writes.insert(pin);
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        let mut pins = self.pins.lock();
        pins.fail_configure.clear();
        pins.fail_writes.clear();
    }
}

/// Simulation driver implementing the `PinDriver` trait.
pub struct SimulationDriver {
    probe: SimulationProbe,
}

impl SimulationDriver {
    /// Create a driver with a private pin bank.
    pub fn new() -> Self {
        Self::with_probe(SimulationProbe::default())
    }

    /// Create a driver sharing `probe`'s pin bank.
    pub fn with_probe(probe: SimulationProbe) -> Self {
        Self { probe }
    }

    /// Handle onto this driver's pin bank.
    pub fn probe(&self) -> SimulationProbe {
        self.probe.clone()
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PinDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn configure_output(&mut self, pin: PinRef) -> Result<(), HalError> {
        let mut pins = self.probe.pins.lock();
        if pins.fail_configure.contains(&pin) {
            return Err(HalError::HardwareInit {
                pin,
                reason: "injected fault".to_string(),
            });
        }
        if pins.claimed.contains_key(&pin) {
            return Err(HalError::HardwareInit {
                pin,
                reason: "already claimed".to_string(),
            });
        }
        pins.claimed.insert(pin, None);
        debug!("Simulated {} configured as output", pin);
        Ok(())
    }

    fn write_pin(&mut self, pin: PinRef, high: bool) -> Result<(), HalError> {
        let mut pins = self.probe.pins.lock();
        if pins.fail_writes.contains(&pin) {
            return Err(HalError::HardwarePin {
                pin,
                reason: "injected fault".to_string(),
            });
        }
        let Some(level) = pins.claimed.get_mut(&pin) else {
            return Err(HalError::HardwarePin {
                pin,
                reason: "not configured as output".to_string(),
            });
        };
        *level = Some(high);
        pins.writes.push((pin, high));
        trace!("Simulated {} <- {}", pin, if high { "HIGH" } else { "LOW" });
        Ok(())
    }

    fn release_all(&mut self) {
        let mut pins = self.probe.pins.lock();
        debug!("Releasing {} simulated pins", pins.claimed.len());
        pins.claimed.clear();
        pins.releases += 1;
    }
}

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn PinDriver> {
    Box::new(SimulationDriver::new())
}
