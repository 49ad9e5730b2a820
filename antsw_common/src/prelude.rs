//! Prelude module for common re-exports.
//!
//! ```rust
//! use antsw_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, StationConfig};

// ─── Hardware access ────────────────────────────────────────────────
pub use crate::hal::config::{DriverConfig, PinMap};
pub use crate::hal::driver::{DriverFactory, HalError, PinDriver};

// ─── Relay model ────────────────────────────────────────────────────
pub use crate::relay::{ConfigurationId, PinRef, RelayId, ToggleId};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CONFIGURATION_COUNT, RELAY_COUNT};
