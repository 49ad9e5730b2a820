//! Pin driver trait and error types.
//!
//! This module defines:
//! - `PinDriver` trait - Interface for pluggable GPIO backends
//! - `HalError` enum - Error types for hardware operations
//! - `DriverFactory` type alias - Factory function type

use crate::hal::config::DriverConfig;
use crate::relay::PinRef;
use thiserror::Error;

/// Error types for hardware operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Pin could not be claimed or configured as output.
    #[error("Failed to configure {pin} as output: {reason}")]
    HardwareInit {
        /// Pin that failed
        pin: PinRef,
        /// Backend-specific reason
        reason: String,
    },

    /// Write to an already configured pin failed.
    #[error("Write to {pin} failed: {reason}")]
    HardwarePin {
        /// Pin that failed
        pin: PinRef,
        /// Backend-specific reason
        reason: String,
    },

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Driver configuration error
    #[error("Driver configuration error: {0}")]
    ConfigError(String),
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn PinDriver>;

/// Trait defining the interface for GPIO pin drivers.
///
/// The relay engine reaches hardware only through this trait, enabling
/// pluggable backends (Linux sysfs, simulation).
///
/// # Lifecycle
///
/// 1. `init()` - Called once with the driver configuration
/// 2. `configure_output()` - Called once per claimed pin at startup
/// 3. `write_pin()` - Called for every relay state change
/// 4. `release_all()` - Called once at shutdown
///
/// Pins are never read back; callers keep the logical state.
pub trait PinDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation", "sysfs").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the driver from configuration.
    ///
    /// Default implementation accepts any configuration.
    fn init(&mut self, _config: &DriverConfig) -> Result<(), HalError> {
        Ok(())
    }

    /// Claim `pin` and configure it as an output.
    ///
    /// # Errors
    /// Return `HalError::HardwareInit` if the pin cannot be claimed.
    fn configure_output(&mut self, pin: PinRef) -> Result<(), HalError>;

    /// Drive `pin` to the given electrical level.
    ///
    /// # Errors
    /// Return `HalError::HardwarePin` if the write fails.
    fn write_pin(&mut self, pin: PinRef, high: bool) -> Result<(), HalError>;

    /// Release every pin claimed by this driver. Must tolerate being
    /// called with nothing claimed.
    fn release_all(&mut self);
}
