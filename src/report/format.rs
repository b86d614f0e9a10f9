//! Formatted terminal output for a sweep run.
//!
//! We keep formatting code in one place so:
//! - the numeric pipeline stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::domain::{CalibratedCurves, SweepConfig};

/// Format the full run summary (grids, solver settings, calibration).
pub fn format_run_summary(config: &SweepConfig, output: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== lepto - thermal leptogenesis mass bounds ===\n");
    out.push_str(&format!(
        "z grid: [{:.3}, {:.3}] with {} points\n",
        config.z_min, config.z_max, config.z_steps
    ));
    out.push_str(&format!(
        "m_tilde grid: [{:.1e}, {:.1e}] eV with {} samples (K = m_tilde / {:.1e})\n",
        config.m_tilde_min, config.m_tilde_max, config.m_tilde_steps, config.m_star
    ));
    out.push_str(&format!(
        "Solver: rtol={:.1e} atol={:.1e} step ceiling={}\n",
        config.rtol, config.atol, config.max_steps_per_interval
    ));
    out.push_str(&format!(
        "Prefactor: A={:.6e} (v={} GeV, m_atm^2={:.1e} eV^2)\n",
        output.calibration.constant_a, config.v_ew, config.m_atm_ev2
    ));

    out.push_str("\nCalibration:\n");
    out.push_str(&format!(
        "- pass 1: factor={:.6e}, thermal mass minimum at m_tilde={:.4e} eV pinned to {:.3e} GeV (got {:.6e})\n",
        output.calibration.factor1,
        output.curves.m_tilde[output.calibration.min_index],
        config.mass_anchor,
        output.calibration.mass_at_min_after_pass1,
    ));
    out.push_str(&format!(
        "- pass 2: factor={:.6e}, thermal efficiency at m_tilde={:.4e} eV pinned to {:.3} (got {:.6})\n",
        output.calibration.factor2,
        output.curves.m_tilde[output.calibration.anchor_index],
        config.anchor_efficiency,
        output.calibration.eff_at_anchor,
    ));

    out
}

/// Format the curve table, printing every `stride`-th sample (plus the last).
pub fn format_curve_table(curves: &CalibratedCurves, stride: usize) -> String {
    let stride = stride.max(1);
    let mut out = String::new();

    out.push_str(&format!(
        "{:>12} {:>13} {:>13} {:>13} {:>13}\n",
        "m_tilde[eV]", "eff thermal", "eff dominant", "M1 thermal", "M1 dominant"
    ));
    let n = curves.m_tilde.len();
    for i in (0..n).step_by(stride).chain(last_if_skipped(n, stride)) {
        out.push_str(&format!(
            "{:>12.4e} {:>13.5e} {:>13.5e} {:>13.5e} {:>13.5e}\n",
            curves.m_tilde[i],
            curves.eff_thermal[i],
            curves.eff_dominant[i],
            curves.mass_thermal[i],
            curves.mass_dominant[i],
        ));
    }

    out
}

/// Yield the final index when the stride walk does not land on it.
fn last_if_skipped(n: usize, stride: usize) -> std::option::IntoIter<usize> {
    if n == 0 || (n - 1) % stride == 0 {
        None.into_iter()
    } else {
        Some(n - 1).into_iter()
    }
}
