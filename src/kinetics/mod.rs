//! Kinetic model of heavy-neutrino decay and washout.
//!
//! Responsibilities:
//!
//! - pure rate functions of dimensionless time and washout strength
//! - the two-state Boltzmann system and its efficiency integral

pub mod boltzmann;
pub mod rates;

pub use boltzmann::*;
pub use rates::*;
