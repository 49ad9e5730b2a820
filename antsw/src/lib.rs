//! # antsw
//!
//! Relay configuration engine for the station antenna switch.
//!
//! Six relays route two beams, two preamps and two radio inputs. Selecting
//! one of five named configurations drives every relay to that row of the
//! configuration table; the two preamp relays can additionally be toggled
//! by hand.
//!
//! # Module Structure
//!
//! - [`binding`] - Override bindings and relay change notifications
//! - [`console`] - Line-oriented operator console
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Pin driver implementations
//! - [`engine`] - ConfigurationEngine: activation, overrides, shutdown
//! - [`line`] - RelayLine: one relay, its pin and cached state
//! - [`table`] - Validated configuration table
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          antsw                               │
//! │  ┌─────────────┐    ┌──────────────────┐    ┌─────────────┐  │
//! │  │  Console    │───►│ ConfigurationEng.│◄──►│ Config      │  │
//! │  │  (toggles)  │◄───│  (Notifier)      │    │ Table       │  │
//! │  └─────────────┘    └────────┬─────────┘    └─────────────┘  │
//! │                              │ RelayLine × 6                 │
//! │                              ▼                               │
//! │                     ┌────────────────┐                       │
//! │                     │  PinDriver     │ (trait object)        │
//! │                     └────────────────┘                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod binding;
pub mod console;
pub mod driver_registry;
pub mod drivers;
pub mod engine;
pub mod line;
pub mod table;

pub use crate::binding::{ChangeListener, Notifier, OverrideBinding, RelayChange};
pub use crate::console::{Command, Console, Flow};
pub use crate::driver_registry::DriverRegistry;
pub use crate::engine::{ConfigurationEngine, EngineError};
pub use crate::line::RelayLine;
pub use crate::table::{ConfigurationTable, TableError};
