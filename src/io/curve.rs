//! Write the curve JSON hand-off file.
//!
//! Curve JSON is the portable representation of a finished run:
//! - the configuration the curves were computed under
//! - calibration factors and anchor diagnostics
//! - the index-aligned efficiency and mass-bound pairs
//!
//! The external plotting collaborator consumes this file read-only; nothing
//! in this crate reads it back. The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::{CurveFile, SweepConfig};
use crate::error::AppError;

/// Write the curve hand-off JSON.
pub fn write_curves_json(path: &Path, config: &SweepConfig, output: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::domain(format!(
            "Failed to create curve JSON '{}': {e}",
            path.display()
        ))
    })?;

    let curve = CurveFile {
        tool: "lepto".to_string(),
        generated: Local::now().to_rfc3339(),
        config: config.clone(),
        calibration: output.calibration.clone(),
        curves: output.curves.clone(),
    };

    serde_json::to_writer_pretty(file, &curve)
        .map_err(|e| AppError::domain(format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}
