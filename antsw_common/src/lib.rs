//! Antenna Switch Common Library
//!
//! Shared identifiers, the GPIO pin driver contract and configuration loading
//! for the antenna switch workspace.
//!
//! # Module Structure
//!
//! - [`relay`] - Relay, configuration and toggle identifiers, relay position names
//! - [`hal`] - Pin driver trait, hardware errors and driver/pin configuration
//! - [`config`] - Configuration loading traits and the station configuration
//! - [`consts`] - System-wide constants
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use antsw_common::prelude::*;
//!
//! let relay: RelayId = "preamp70".parse().unwrap();
//! assert!(relay.is_override());
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
pub mod relay;
