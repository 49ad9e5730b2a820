//! Names for the two positions of each relay kind.
//!
//! The configuration table stores raw booleans. These constants only make
//! a table row readable at the definition site; they carry no behavior.

/// Preamp energized.
pub const ON: bool = true;
/// Preamp bypassed.
pub const OFF: bool = false;

/// Beam routed to the TS-2000 bus.
pub const TS2K_BUS: bool = false;
/// Beam routed to the SDR bus.
pub const SDR_BUS: bool = true;

/// TS-2000 or SDR connected to the beam side.
pub const BEAM: bool = true;
/// TS-2000 connected to the dual-band J-pole.
pub const J_POLE: bool = false;
/// SDR connected to the omni antenna.
pub const OMNI: bool = false;
