//! Input/output helpers.
//!
//! - curve JSON hand-off write (`curve`)

pub mod curve;

pub use curve::*;
