//! Relay, configuration, toggle and pin identifiers.
//!
//! `RelayId` and `ConfigurationId` are closed enums: the relay topology and
//! the configuration set are fixed at build time. Both parse from their
//! short key or their display label, case-insensitively.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::consts::{CONFIGURATION_COUNT, RELAY_COUNT};

// ─── RelayId ────────────────────────────────────────────────────────

/// One managed relay, in configuration table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RelayId {
    /// Preamp on the 70cm beam.
    Preamp70 = 0,
    /// Preamp on the 2m beam.
    Preamp2m = 1,
    /// Routes the 2m beam to the TS-2000 bus or the SDR bus.
    Beam2m = 2,
    /// Routes the 70cm beam to the TS-2000 bus or the SDR bus.
    Beam70 = 3,
    /// Connects the TS-2000 to the beam bus or the dual-band J-pole.
    Ts2kAntenna = 4,
    /// Connects the SDR to the SDR bus or the omni antenna.
    SdrAntenna = 5,
}

impl RelayId {
    /// All relays in table order.
    pub const ALL: [RelayId; RELAY_COUNT] = [
        Self::Preamp70,
        Self::Preamp2m,
        Self::Beam2m,
        Self::Beam70,
        Self::Ts2kAntenna,
        Self::SdrAntenna,
    ];

    /// Relays that can be driven directly by an override toggle.
    pub const OVERRIDES: [RelayId; 2] = [Self::Preamp70, Self::Preamp2m];

    /// Position of this relay in a target vector.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`RelayId::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short machine key, e.g. `"preamp70"`.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Preamp70 => "preamp70",
            Self::Preamp2m => "preamp2m",
            Self::Beam2m => "beam2m",
            Self::Beam70 => "beam70",
            Self::Ts2kAntenna => "ts2k",
            Self::SdrAntenna => "sdr",
        }
    }

    /// Operator-facing label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Preamp70 => "70cm Preamp",
            Self::Preamp2m => "2m Preamp",
            Self::Beam2m => "2m Beam",
            Self::Beam70 => "70cm Beam",
            Self::Ts2kAntenna => "TS-2000 Antenna",
            Self::SdrAntenna => "SDR Antenna",
        }
    }

    /// Whether this relay may diverge from the active configuration.
    pub const fn is_override(self) -> bool {
        matches!(self, Self::Preamp70 | Self::Preamp2m)
    }

    /// Name of the position a logical state selects on this relay.
    pub const fn position_name(self, state: bool) -> &'static str {
        match (self, state) {
            (Self::Preamp70 | Self::Preamp2m, true) => "On",
            (Self::Preamp70 | Self::Preamp2m, false) => "Off",
            (Self::Beam2m | Self::Beam70, true) => "SDR Bus",
            (Self::Beam2m | Self::Beam70, false) => "TS2K Bus",
            (Self::Ts2kAntenna, true) => "Beam",
            (Self::Ts2kAntenna, false) => "J-pole",
            (Self::SdrAntenna, true) => "SDR Bus",
            (Self::SdrAntenna, false) => "Omni",
        }
    }
}

const_assert_eq!(RelayId::ALL.len(), RELAY_COUNT);

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RelayId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.key().eq_ignore_ascii_case(s) || r.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown relay: {s:?}"))
    }
}

// ─── ConfigurationId ────────────────────────────────────────────────

/// One named station configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigurationId {
    /// U/v satellite: uplink 70cm, downlink 2m.
    UvSatcom,
    /// V/u satellite: uplink 2m, downlink 70cm.
    VuSatcom,
    /// Local repeater work on the J-pole.
    LocalRepeater,
    /// UHF telemetry on the SDR via the 70cm beam.
    UhfTelemetry,
    /// VHF telemetry on the SDR via the 2m beam.
    VhfTelemetry,
}

impl ConfigurationId {
    /// All configurations in presentation order.
    pub const ALL: [ConfigurationId; CONFIGURATION_COUNT] = [
        Self::UvSatcom,
        Self::VuSatcom,
        Self::LocalRepeater,
        Self::UhfTelemetry,
        Self::VhfTelemetry,
    ];

    /// Configuration applied at startup.
    pub const DEFAULT: ConfigurationId = Self::LocalRepeater;

    /// Short machine key, e.g. `"uv-satcom"`.
    pub const fn key(self) -> &'static str {
        match self {
            Self::UvSatcom => "uv-satcom",
            Self::VuSatcom => "vu-satcom",
            Self::LocalRepeater => "local-repeater",
            Self::UhfTelemetry => "uhf-telemetry",
            Self::VhfTelemetry => "vhf-telemetry",
        }
    }

    /// Operator-facing label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::UvSatcom => "U/v Satcom",
            Self::VuSatcom => "V/u Satcom",
            Self::LocalRepeater => "Local Repeater",
            Self::UhfTelemetry => "UHF Telemetry",
            Self::VhfTelemetry => "VHF Telemetry",
        }
    }
}

const_assert_eq!(ConfigurationId::ALL.len(), CONFIGURATION_COUNT);

impl Default for ConfigurationId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConfigurationId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s) || c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown configuration: {s:?}"))
    }
}

// ─── ToggleId ───────────────────────────────────────────────────────

/// Identifier of a presentation-layer toggle bound to a relay.
///
/// Opaque to the engine; the presentation layer picks the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToggleId(pub u32);

impl fmt::Display for ToggleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toggle#{}", self.0)
    }
}

// ─── PinRef ─────────────────────────────────────────────────────────

/// Hardware GPIO line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinRef(pub u32);

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}
