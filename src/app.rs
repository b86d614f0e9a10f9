//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - runs the sweep-and-calibrate pipeline with the built-in configuration
//! - prints the run summary and the curve table
//! - writes the optional curve JSON hand-off for external plotting
//!
//! The computation takes no parameters beyond the compiled-in defaults; the
//! only accepted argument is an optional output path for the hand-off file.

use std::path::Path;

use crate::domain::SweepConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `lepto` binary.
pub fn run() -> Result<(), AppError> {
    let mut args = std::env::args().skip(1);
    let export = args.next();
    if let Some(extra) = args.next() {
        return Err(AppError::domain(format!(
            "Unexpected argument '{extra}'. Usage: lepto [curves.json]"
        )));
    }

    let config = SweepConfig::default();
    let output = pipeline::run(&config)?;

    println!("{}", crate::report::format_run_summary(&config, &output));
    println!("{}", crate::report::format_curve_table(&output.curves, 5));

    if let Some(path) = export {
        let path = Path::new(&path);
        crate::io::curve::write_curves_json(path, &config, &output)?;
        println!("Curves written to {}", path.display());
    }

    Ok(())
}
