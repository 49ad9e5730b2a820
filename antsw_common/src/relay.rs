//! Relay model identifiers.
//!
//! Fixed at build time: the set of relays, the set of configurations and
//! the names given to each relay's two positions.

pub mod id;
pub mod position;

pub use id::{ConfigurationId, PinRef, RelayId, ToggleId};
