//! The full sweep-and-calibrate pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate config -> build grids -> integrate sweep -> calibrate -> curves
//!
//! The binary and the tests can then focus on presentation and properties.

use crate::calibrate;
use crate::domain::{CalibratedCurves, Calibration, SweepConfig, SweepResult};
use crate::error::AppError;
use crate::sweep;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Raw (uncalibrated) efficiencies.
    pub sweep: SweepResult,
    /// Factors and anchor diagnostics of the two passes.
    pub calibration: Calibration,
    /// Final index-aligned curve pairs.
    pub curves: CalibratedCurves,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run(config: &SweepConfig) -> Result<RunOutput, AppError> {
    // 1) Validate and sweep. The sweep joins all integrations before
    //    returning, so calibration always sees fully-populated curves.
    let sweep = sweep::run_sweep(config)?;

    // 2) Convert to mass bounds and pin the absolute scale.
    let (curves, calibration) = calibrate::calibrate(config, &sweep)?;

    Ok(RunOutput {
        sweep,
        calibration,
        curves,
    })
}
