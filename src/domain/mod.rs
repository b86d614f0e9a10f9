//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the immutable run configuration (`SweepConfig`)
//! - the initial-condition scenarios (`Scenario`)
//! - sweep and calibration outputs (`SweepResult`, `Calibration`,
//!   `CalibratedCurves`, `CurveFile`)

pub mod types;

pub use types::*;
