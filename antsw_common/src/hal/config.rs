//! Driver selection and relay pin mapping.
//!
//! Deserialized from the `[driver]` and `[pins]` tables of the station
//! configuration. Pin numbers are kernel GPIO line numbers (BCM numbering
//! on a Raspberry Pi), not header positions.
//!
//! # TOML Example
//!
//! ```toml
//! [driver]
//! name = "sysfs"
//! sysfs_root = "/sys/class/gpio"
//!
//! [pins]
//! active_low = true
//! preamp_70cm = 9
//! preamp_2m = 11
//! beam_2m = 5
//! beam_70cm = 6
//! ts2k_antenna = 13
//! sdr_antenna = 19
//! spare = [26, 10]
//! ```

use crate::config::ConfigError;
use crate::consts::{DEFAULT_DRIVER, DEFAULT_SYSFS_GPIO_ROOT};
use crate::relay::{PinRef, RelayId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

fn default_driver_name() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from(DEFAULT_SYSFS_GPIO_ROOT)
}

/// Driver selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Registered driver name.
    #[serde(default = "default_driver_name")]
    pub name: String,

    /// Root of the sysfs GPIO tree (sysfs driver only).
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: default_driver_name(),
            sysfs_root: default_sysfs_root(),
        }
    }
}

/// Relay-to-pin mapping.
///
/// Defaults match the relay board wiring on the station's Raspberry Pi
/// (header pins 21, 23, 29, 31, 33, 35 for the relays, 37 and 19 spare).
/// Missing fields keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PinMap {
    /// Relay board energizes a coil on a LOW output.
    pub active_low: bool,
    /// 70cm preamp relay.
    pub preamp_70cm: PinRef,
    /// 2m preamp relay.
    pub preamp_2m: PinRef,
    /// 2m beam bus relay.
    pub beam_2m: PinRef,
    /// 70cm beam bus relay.
    pub beam_70cm: PinRef,
    /// TS-2000 antenna relay.
    pub ts2k_antenna: PinRef,
    /// SDR antenna relay.
    pub sdr_antenna: PinRef,
    /// Spare relays held de-energized.
    pub spare: Vec<PinRef>,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            active_low: true,
            preamp_70cm: PinRef(9),
            preamp_2m: PinRef(11),
            beam_2m: PinRef(5),
            beam_70cm: PinRef(6),
            ts2k_antenna: PinRef(13),
            sdr_antenna: PinRef(19),
            spare: vec![PinRef(26), PinRef(10)],
        }
    }
}

impl PinMap {
    /// Pin driving `relay`.
    pub fn pin(&self, relay: RelayId) -> PinRef {
        match relay {
            RelayId::Preamp70 => self.preamp_70cm,
            RelayId::Preamp2m => self.preamp_2m,
            RelayId::Beam2m => self.beam_2m,
            RelayId::Beam70 => self.beam_70cm,
            RelayId::Ts2kAntenna => self.ts2k_antenna,
            RelayId::SdrAntenna => self.sdr_antenna,
        }
    }

    /// Electrical level that puts a relay in logical `state`.
    #[inline]
    pub fn level(&self, state: bool) -> bool {
        state != self.active_low
    }

    /// Validate the mapping.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if any pin is used twice,
    /// whether by two relays, two spares or a relay and a spare.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        let relays = RelayId::ALL
            .into_iter()
            .map(|r| (self.pin(r), r.key().to_string()));
        let spares = self
            .spare
            .iter()
            .enumerate()
            .map(|(idx, pin)| (*pin, format!("spare[{idx}]")));

        for (pin, owner) in relays.chain(spares) {
            if !seen.insert(pin) {
                return Err(ConfigError::ValidationError(format!(
                    "{pin} assigned twice (second use: {owner})"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pin_map_is_valid() {
        assert!(PinMap::default().validate().is_ok());
    }

    #[test]
    fn duplicate_relay_pin_rejected() {
        let map = PinMap {
            beam_70cm: PinRef(5),
            ..PinMap::default()
        };
        let err = map.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("GPIO5"));
    }

    #[test]
    fn spare_colliding_with_relay_rejected() {
        let map = PinMap {
            spare: vec![PinRef(9)],
            ..PinMap::default()
        };
        assert!(map.validate().is_err());
    }

    #[test]
    fn level_follows_polarity() {
        let active_low = PinMap::default();
        assert!(!active_low.level(true));
        assert!(active_low.level(false));

        let active_high = PinMap {
            active_low: false,
            ..PinMap::default()
        };
        assert!(active_high.level(true));
        assert!(!active_high.level(false));
    }

    #[test]
    fn pin_lookup_covers_every_relay() {
        let map = PinMap::default();
        let pins: HashSet<_> = RelayId::ALL.into_iter().map(|r| map.pin(r)).collect();
        assert_eq!(pins.len(), RelayId::ALL.len());
    }
}
