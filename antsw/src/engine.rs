//! Configuration engine.
//!
//! Owns the pin driver and one [`RelayLine`] per managed relay. Selecting a
//! configuration rewrites every relay in table order; an override writes a
//! single preamp relay directly and leaves the active configuration alone.
//!
//! # Failure semantics
//!
//! Writes are applied sequentially with no rollback. If relay `k` fails,
//! relays before `k` already hold the new configuration, relays from `k`
//! on keep their previous state, and the active configuration does not
//! change. Line caches always match what was actually written.

use antsw_common::consts::RELAY_COUNT;
use antsw_common::hal::config::PinMap;
use antsw_common::hal::driver::{HalError, PinDriver};
use antsw_common::relay::{ConfigurationId, PinRef, RelayId};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::binding::{ChangeListener, Notifier, OverrideBinding, RelayChange};
use crate::line::RelayLine;
use crate::table::{ConfigurationTable, TableError};

/// Errors reported by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Pin claim or pin write failed.
    #[error(transparent)]
    Hardware(#[from] HalError),

    /// A configuration was only partly applied.
    #[error("configuration '{configuration}' stopped after {applied} relay(s): {source}")]
    PartialApply {
        /// Configuration being applied
        configuration: ConfigurationId,
        /// Relays written before the failure
        applied: usize,
        /// The failed write
        #[source]
        source: HalError,
    },

    /// Malformed configuration table.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Identifier not present in the table.
    #[error("unknown configuration: {0}")]
    UnknownConfiguration(String),

    /// Relay is not one of the override relays.
    #[error("{0} cannot be overridden")]
    NotOverridable(RelayId),

    /// `shutdown()` already released the pins.
    #[error("engine has been shut down")]
    ShutDown,
}

impl EngineError {
    /// The underlying hardware error, if any.
    pub fn hal_error(&self) -> Option<&HalError> {
        match self {
            Self::Hardware(e) | Self::PartialApply { source: e, .. } => Some(e),
            _ => None,
        }
    }
}

/// The relay configuration engine.
pub struct ConfigurationEngine {
    driver: Box<dyn PinDriver>,
    /// One line per relay, in `RelayId::ALL` order
    lines: Vec<RelayLine>,
    /// Spare relays held de-energized
    spares: Vec<PinRef>,
    table: ConfigurationTable,
    active: ConfigurationId,
    notifier: Notifier,
    shut_down: bool,
}

impl ConfigurationEngine {
    /// Claim every relay pin and drive it to the table's default row, then
    /// claim the spare pins and hold them de-energized.
    ///
    /// # Errors
    /// Returns `EngineError::Hardware(HalError::HardwareInit)` if any pin
    /// cannot be claimed. Pins claimed so far are released first.
    pub fn new(
        mut driver: Box<dyn PinDriver>,
        pins: &PinMap,
        table: ConfigurationTable,
    ) -> Result<Self, EngineError> {
        let default = table.default_configuration();
        let initial = table
            .targets(default)
            .ok_or(TableError::MissingDefault(default))?
            .to_vec();

        info!(
            "Starting engine on driver {} v{} with default '{}'",
            driver.name(),
            driver.version(),
            default
        );

        let mut lines = Vec::with_capacity(RELAY_COUNT);
        for relay in RelayId::ALL {
            let pin = pins.pin(relay);
            match RelayLine::create(
                relay,
                pin,
                pins.active_low,
                initial[relay.index()],
                driver.as_mut(),
            ) {
                Ok(line) => lines.push(line),
                Err(e) => {
                    error!("Relay {} on {}: {}", relay.key(), pin, e);
                    driver.release_all();
                    return Err(e.into());
                }
            }
        }

        for &pin in &pins.spare {
            if let Err(e) = claim_spare(driver.as_mut(), pin, pins.level(false)) {
                error!("Spare relay on {}: {}", pin, e);
                driver.release_all();
                return Err(e.into());
            }
        }

        info!(
            "Claimed {} relay pins and {} spare pins",
            lines.len(),
            pins.spare.len()
        );

        Ok(Self {
            driver,
            lines,
            spares: pins.spare.clone(),
            table,
            active: default,
            notifier: Notifier::new(),
            shut_down: false,
        })
    }

    /// Apply every target of `id`, in table order.
    ///
    /// # Errors
    /// - `UnknownConfiguration` if the table has no row for `id`; nothing is written
    /// - `PartialApply` if a write fails; see the module docs
    pub fn activate(&mut self, id: ConfigurationId) -> Result<(), EngineError> {
        self.ensure_running()?;

        let Some(targets) = self.table.targets(id) else {
            warn!("Configuration '{}' is not in the table", id);
            return Err(EngineError::UnknownConfiguration(id.key().to_string()));
        };

        debug!("Activating '{}'", id);
        for (applied, (line, &target)) in self.lines.iter_mut().zip(targets).enumerate() {
            if let Err(source) = line.write(target, self.driver.as_mut(), &mut self.notifier) {
                warn!(
                    "Activation of '{}' stopped at relay {} after {} write(s): {}",
                    id,
                    line.relay().key(),
                    applied,
                    source
                );
                return Err(EngineError::PartialApply {
                    configuration: id,
                    applied,
                    source,
                });
            }
        }

        let previous = std::mem::replace(&mut self.active, id);
        info!("Configuration '{}' active (was '{}')", id, previous);
        Ok(())
    }

    /// Parse `name` as a configuration key or label and activate it.
    pub fn activate_named(&mut self, name: &str) -> Result<(), EngineError> {
        let id: ConfigurationId = name
            .parse()
            .map_err(|_| EngineError::UnknownConfiguration(name.trim().to_string()))?;
        self.activate(id)
    }

    /// Drive an override relay directly, bypassing the table.
    ///
    /// The change is published without a toggle, so the bound toggle that
    /// initiated it is not asked to re-sync while other listeners still see
    /// it. The active configuration is unchanged.
    pub fn set_override(&mut self, relay: RelayId, state: bool) -> Result<(), EngineError> {
        self.ensure_running()?;
        if !relay.is_override() {
            return Err(EngineError::NotOverridable(relay));
        }

        self.lines[relay.index()].write_only(state, self.driver.as_mut())?;
        self.notifier.notify(&RelayChange {
            relay,
            energized: state,
            toggle: None,
        });
        info!(
            "Override {} -> {} (configuration '{}' unchanged)",
            relay.key(),
            relay.position_name(state),
            self.active
        );
        Ok(())
    }

    /// Bind a toggle to an override relay, returning the binding it replaces.
    pub fn attach_override(
        &mut self,
        binding: OverrideBinding,
    ) -> Result<Option<OverrideBinding>, EngineError> {
        let relay = binding.relay();
        if !relay.is_override() {
            return Err(EngineError::NotOverridable(relay));
        }
        debug!("Binding {} to {}", binding.toggle(), relay.key());
        Ok(self.lines[relay.index()].attach_override(binding))
    }

    /// Subscribe to relay change notifications.
    pub fn subscribe(&mut self, listener: Box<dyn ChangeListener>) {
        self.notifier.subscribe(listener);
    }

    /// Energize each relay in table order, then de-energize each, calling
    /// `pause` after every step, then re-apply the active configuration.
    ///
    /// # Errors
    /// If a write fails the walk stops, the active configuration is
    /// re-applied as far as the hardware allows, and the failed write is
    /// returned as `EngineError::Hardware`.
    pub fn identify<F>(&mut self, mut pause: F) -> Result<(), EngineError>
    where
        F: FnMut(RelayId, bool),
    {
        self.ensure_running()?;
        info!("Starting relay identification walk");

        let active = self.active;
        if let Err(e) = self.walk(&mut pause) {
            warn!("Identification walk stopped: {}", e);
            if let Err(restore) = self.activate(active) {
                error!("Could not restore '{}' after walk: {}", active, restore);
            }
            return Err(e.into());
        }

        self.activate(active)?;
        info!("Identification walk complete, '{}' restored", active);
        Ok(())
    }

    fn walk<F>(&mut self, pause: &mut F) -> Result<(), HalError>
    where
        F: FnMut(RelayId, bool),
    {
        for state in [true, false] {
            for line in self.lines.iter_mut() {
                line.write(state, self.driver.as_mut(), &mut self.notifier)?;
                pause(line.relay(), state);
            }
        }
        Ok(())
    }

    /// Release every pin. Terminal and idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.driver.release_all();
        self.shut_down = true;
        info!("Engine shut down, all pins released");
    }

    /// Currently active configuration.
    pub fn active_configuration(&self) -> ConfigurationId {
        self.active
    }

    /// Cached logical state of `relay`.
    pub fn relay_state(&self, relay: RelayId) -> bool {
        self.lines[relay.index()].current_state()
    }

    /// Cached logical state of every relay, in table order.
    pub fn states(&self) -> [bool; RELAY_COUNT] {
        std::array::from_fn(|idx| self.lines[idx].current_state())
    }

    /// Relays whose state differs from the active configuration's target.
    pub fn diverged_relays(&self) -> Vec<RelayId> {
        let Some(targets) = self.table.targets(self.active) else {
            return Vec::new();
        };
        self.lines
            .iter()
            .zip(targets)
            .filter(|(line, target)| line.current_state() != **target)
            .map(|(line, _)| line.relay())
            .collect()
    }

    /// `(identifier, label)` pairs in table order.
    pub fn list_configurations(&self) -> Vec<(ConfigurationId, &'static str)> {
        self.table.configurations().collect()
    }

    /// The configuration table in use.
    pub fn table(&self) -> &ConfigurationTable {
        &self.table
    }

    /// Current binding of `relay`.
    pub fn binding(&self, relay: RelayId) -> Option<OverrideBinding> {
        self.lines[relay.index()].binding()
    }

    /// Pin driving `relay`.
    pub fn pin(&self, relay: RelayId) -> PinRef {
        self.lines[relay.index()].pin()
    }

    /// Spare pins held de-energized.
    pub fn spare_pins(&self) -> &[PinRef] {
        &self.spares
    }

    /// Name of the active driver.
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Whether `shutdown()` has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        if self.shut_down {
            Err(EngineError::ShutDown)
        } else {
            Ok(())
        }
    }
}

impl Drop for ConfigurationEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn claim_spare(driver: &mut dyn PinDriver, pin: PinRef, level: bool) -> Result<(), HalError> {
    driver.configure_output(pin)?;
    driver
        .write_pin(pin, level)
        .map_err(|e| HalError::HardwareInit {
            pin,
            reason: format!("initial write failed: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::{SimulationDriver, SimulationProbe};

    fn engine() -> (ConfigurationEngine, SimulationProbe) {
        let probe = SimulationProbe::default();
        let driver = Box::new(SimulationDriver::with_probe(probe.clone()));
        let engine = ConfigurationEngine::new(
            driver,
            &PinMap::default(),
            ConfigurationTable::builtin().unwrap(),
        )
        .expect("engine");
        (engine, probe)
    }

    #[test]
    fn startup_applies_default_row_and_holds_spares() {
        let (engine, probe) = engine();
        let pins = PinMap::default();

        assert_eq!(engine.active_configuration(), ConfigurationId::LocalRepeater);
        assert_eq!(engine.states(), [false; RELAY_COUNT]);
        // Active-low board: every de-energized relay and spare reads HIGH.
        for relay in RelayId::ALL {
            assert_eq!(probe.level(pins.pin(relay)), Some(true));
        }
        for pin in &pins.spare {
            assert_eq!(probe.level(*pin), Some(true));
        }
        assert_eq!(engine.spare_pins(), pins.spare.as_slice());
    }

    #[test]
    fn failed_claim_releases_everything() {
        let probe = SimulationProbe::default();
        probe.fail_configure(PinMap::default().beam_70cm);
        let driver = Box::new(SimulationDriver::with_probe(probe.clone()));

        let result = ConfigurationEngine::new(
            driver,
            &PinMap::default(),
            ConfigurationTable::builtin().unwrap(),
        );
        assert!(matches!(
            result,
            Err(EngineError::Hardware(HalError::HardwareInit { .. }))
        ));
        assert!(probe.claimed_pins().is_empty());
        assert_eq!(probe.release_count(), 1);
    }

    #[test]
    fn failed_spare_claim_is_fatal() {
        let probe = SimulationProbe::default();
        probe.fail_writes(PinMap::default().spare[1]);
        let driver = Box::new(SimulationDriver::with_probe(probe.clone()));

        let result = ConfigurationEngine::new(
            driver,
            &PinMap::default(),
            ConfigurationTable::builtin().unwrap(),
        );
        assert!(matches!(
            result,
            Err(EngineError::Hardware(HalError::HardwareInit { .. }))
        ));
        assert!(probe.claimed_pins().is_empty());
    }

    #[test]
    fn activate_named_accepts_labels() {
        let (mut engine, _) = engine();
        engine.activate_named("VHF Telemetry").unwrap();
        assert_eq!(engine.active_configuration(), ConfigurationId::VhfTelemetry);

        let err = engine.activate_named("HF Contest").unwrap_err();
        assert!(matches!(err, EngineError::UnknownConfiguration(ref n) if n == "HF Contest"));
        assert_eq!(engine.active_configuration(), ConfigurationId::VhfTelemetry);
    }

    #[test]
    fn diverged_relays_reports_overrides() {
        let (mut engine, _) = engine();
        assert!(engine.diverged_relays().is_empty());
        engine.set_override(RelayId::Preamp70, true).unwrap();
        assert_eq!(engine.diverged_relays(), vec![RelayId::Preamp70]);
        engine.activate(ConfigurationId::LocalRepeater).unwrap();
        assert!(engine.diverged_relays().is_empty());
    }

    #[test]
    fn non_preamp_relays_cannot_be_overridden() {
        let (mut engine, _) = engine();
        assert!(matches!(
            engine.set_override(RelayId::Beam2m, true),
            Err(EngineError::NotOverridable(RelayId::Beam2m))
        ));
        assert!(matches!(
            engine.attach_override(OverrideBinding::new(
                RelayId::SdrAntenna,
                antsw_common::relay::ToggleId(1)
            )),
            Err(EngineError::NotOverridable(RelayId::SdrAntenna))
        ));
    }

    #[test]
    fn drop_releases_pins() {
        let (engine, probe) = engine();
        drop(engine);
        assert!(probe.claimed_pins().is_empty());
        assert_eq!(probe.release_count(), 1);
    }

    #[test]
    fn hal_error_accessor() {
        let err = EngineError::PartialApply {
            configuration: ConfigurationId::UvSatcom,
            applied: 2,
            source: HalError::HardwarePin {
                pin: PinRef(5),
                reason: "x".to_string(),
            },
        };
        assert!(matches!(err.hal_error(), Some(HalError::HardwarePin { .. })));
        assert!(EngineError::ShutDown.hal_error().is_none());
        assert!(err.to_string().contains("after 2 relay(s)"));
    }
}
