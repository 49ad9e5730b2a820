//! Hardware access contract and configuration.
//!
//! This module contains the pin driver trait, its error type and the
//! configuration types that select a driver and map relays to pins.

pub mod config;
pub mod driver;
