//! Mass-bound conversion and two-pass scale calibration.
//!
//! The raw efficiencies of the two-state kinetic model are only relatively
//! correct: the absolute normalization of the full multi-flavor computation
//! is pinned afterwards against two independent anchors.
//!
//! - Pass 1: the minimum of the thermal mass curve is matched to the mass
//!   anchor by rescaling BOTH efficiency curves with one factor.
//! - Pass 2: the thermal efficiency at the sample nearest the reference
//!   effective mass is matched to the anchor efficiency, again rescaling
//!   both curves.
//!
//! Exactly two passes, in this order, each reading the state the previous
//! pass left; the passes are never iterated to a fixed point. Mass curves
//! are recomputed whole from their efficiency curve after every rescale,
//! never patched element by element.

use crate::domain::{Calibration, CalibratedCurves, SweepConfig, SweepResult};
use crate::error::AppError;

/// Analytic prefactor `A = (3/(16 pi)) (1/v^2) sqrt(m_atm^2)`, with the
/// splitting converted from eV^2 into the mass bound's squared-energy units.
pub fn calibration_constant(config: &SweepConfig) -> f64 {
    let m_atm_sq = config.m_atm_ev2 * config.ev_to_gev * config.ev_to_gev;
    3.0 / (16.0 * std::f64::consts::PI) / (config.v_ew * config.v_ew) * m_atm_sq.sqrt()
}

/// Minimum heavy-neutrino mass required to reach the observed asymmetry at
/// a given efficiency. The floor keeps the division defined for vanishing
/// (or transiently negative) efficiencies; clipping is policy, not an error.
pub fn required_mass(constant_a: f64, config: &SweepConfig, efficiency: f64) -> f64 {
    config.y_b_obs / (constant_a * efficiency.max(config.eff_floor))
}

fn mass_curve(constant_a: f64, config: &SweepConfig, efficiencies: &[f64]) -> Vec<f64> {
    efficiencies
        .iter()
        .map(|&eff| required_mass(constant_a, config, eff))
        .collect()
}

/// Index of the minimum value; ties resolve to the lowest index.
fn argmin(values: &[f64]) -> Result<usize, AppError> {
    if values.is_empty() {
        return Err(AppError::calibration("Cannot take a minimum of an empty curve."));
    }
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(AppError::calibration(format!(
                "Non-finite mass bound at index {i}; calibration has no anchor."
            )));
        }
        if v < values[best] {
            best = i;
        }
    }
    Ok(best)
}

/// Index of the sample nearest `target` by absolute difference; ties resolve
/// to the lowest index.
fn nearest_index(samples: &[f64], target: f64) -> Result<usize, AppError> {
    if samples.is_empty() {
        return Err(AppError::calibration(
            "Cannot locate a reference sample on an empty grid.",
        ));
    }
    let mut best = 0;
    let mut best_dist = (samples[0] - target).abs();
    for (i, &s) in samples.iter().enumerate().skip(1) {
        let dist = (s - target).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    Ok(best)
}

fn checked_factor(value: f64, what: &str) -> Result<f64, AppError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(AppError::calibration(format!(
            "{what} must be a positive finite scalar; got {value}."
        )));
    }
    Ok(value)
}

fn scale_in_place(values: &mut [f64], factor: f64) {
    for v in values.iter_mut() {
        *v *= factor;
    }
}

/// Apply both calibration passes and produce the final curve pairs.
pub fn calibrate(
    config: &SweepConfig,
    sweep: &SweepResult,
) -> Result<(CalibratedCurves, Calibration), AppError> {
    if sweep.m_tilde.is_empty() || sweep.thermal.len() != sweep.m_tilde.len() {
        return Err(AppError::calibration(
            "Sweep output is empty or misaligned; nothing to calibrate.",
        ));
    }

    let constant_a = calibration_constant(config);
    let mut eff_thermal = sweep.thermal.clone();
    let mut eff_dominant = sweep.dominant.clone();

    // Pass 1: pin the thermal mass-curve minimum to the mass anchor. Mass is
    // inversely proportional to efficiency, so matching the minimum means
    // multiplying the efficiencies by (observed minimum / anchor).
    let mass_thermal = mass_curve(constant_a, config, &eff_thermal);
    let min_index = argmin(&mass_thermal)?;
    let factor1 = checked_factor(
        mass_thermal[min_index] / config.mass_anchor,
        "Pass-1 scale factor",
    )?;
    scale_in_place(&mut eff_thermal, factor1);
    scale_in_place(&mut eff_dominant, factor1);
    let mass_thermal = mass_curve(constant_a, config, &eff_thermal);
    let mass_at_min_after_pass1 = mass_thermal[min_index];

    // Pass 2: pin the thermal efficiency at the sample nearest the reference
    // effective mass. The divisor is floored so a degenerate all-clipped
    // sweep still calibrates to finite values.
    let anchor_index = nearest_index(&sweep.m_tilde, config.anchor_m_tilde)?;
    let factor2 = checked_factor(
        config.anchor_efficiency / eff_thermal[anchor_index].max(config.eff_floor),
        "Pass-2 scale factor",
    )?;
    scale_in_place(&mut eff_thermal, factor2);
    scale_in_place(&mut eff_dominant, factor2);
    let mass_thermal = mass_curve(constant_a, config, &eff_thermal);
    let mass_dominant = mass_curve(constant_a, config, &eff_dominant);

    let calibration = Calibration {
        constant_a,
        factor1,
        min_index,
        mass_at_min_after_pass1,
        factor2,
        anchor_index,
        eff_at_anchor: eff_thermal[anchor_index],
    };
    let curves = CalibratedCurves {
        m_tilde: sweep.m_tilde.clone(),
        eff_thermal,
        eff_dominant,
        mass_thermal,
        mass_dominant,
    };
    Ok((curves, calibration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::log_space;

    fn synthetic_sweep(thermal: Vec<f64>, dominant: Vec<f64>) -> SweepResult {
        let n = thermal.len();
        let m_tilde = log_space(1e-10, 1.0, n.max(2)).unwrap()[..n].to_vec();
        let washout = m_tilde.iter().map(|m| m / 1e-3).collect();
        SweepResult {
            m_tilde,
            washout,
            thermal,
            dominant,
        }
    }

    fn peaked_sweep(n: usize) -> SweepResult {
        // A smooth single-peak efficiency profile over the m_tilde grid.
        let m_tilde = log_space(1e-10, 1.0, n).unwrap();
        let thermal: Vec<f64> = m_tilde
            .iter()
            .map(|m| {
                let x = (m / 1e-3).ln();
                (-(x * x) / 20.0).exp()
            })
            .collect();
        let dominant: Vec<f64> = thermal.iter().map(|t| t * 3.0).collect();
        let washout = m_tilde.iter().map(|m| m / 1e-3).collect();
        SweepResult {
            m_tilde,
            washout,
            thermal,
            dominant,
        }
    }

    #[test]
    fn required_mass_is_inverse_in_efficiency() {
        let config = SweepConfig::default();
        let a = calibration_constant(&config);
        let m1 = required_mass(a, &config, 0.2);
        let m2 = required_mass(a, &config, 0.4);
        assert!((m1 / m2 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn prefactor_matches_direct_evaluation() {
        let config = SweepConfig::default();
        let a = calibration_constant(&config);
        let expected = 3.0 / (16.0 * std::f64::consts::PI) / (246.0 * 246.0)
            * (2.5e-3_f64 * 1.602e-9 * 1.602e-9).sqrt();
        assert!((a - expected).abs() < 1e-25);
    }

    #[test]
    fn pass1_pins_minimum_mass_to_anchor() {
        let config = SweepConfig::default();
        let (_, calibration) = calibrate(&config, &peaked_sweep(100)).unwrap();
        let rel = (calibration.mass_at_min_after_pass1 - config.mass_anchor).abs()
            / config.mass_anchor;
        assert!(rel < 1e-6, "pass-1 anchor off by {rel:.2e}");
    }

    #[test]
    fn pass2_pins_anchor_efficiency() {
        let config = SweepConfig::default();
        let (curves, calibration) = calibrate(&config, &peaked_sweep(100)).unwrap();
        let rel = (calibration.eff_at_anchor - config.anchor_efficiency).abs()
            / config.anchor_efficiency;
        assert!(rel < 1e-6, "pass-2 anchor off by {rel:.2e}");
        assert_eq!(
            curves.eff_thermal[calibration.anchor_index],
            calibration.eff_at_anchor
        );
    }

    #[test]
    fn dominant_curve_shares_the_thermal_factors() {
        let config = SweepConfig::default();
        let sweep = peaked_sweep(100);
        let (curves, calibration) = calibrate(&config, &sweep).unwrap();
        let total = calibration.factor1 * calibration.factor2;
        for (raw, calibrated) in sweep.dominant.iter().zip(curves.eff_dominant.iter()) {
            assert!((raw * total - calibrated).abs() <= 1e-12 * calibrated.abs());
        }
    }

    #[test]
    fn final_mass_curves_derive_from_final_efficiencies() {
        let config = SweepConfig::default();
        let (curves, calibration) = calibrate(&config, &peaked_sweep(64)).unwrap();
        for (eff, mass) in curves.eff_thermal.iter().zip(curves.mass_thermal.iter()) {
            let expected = required_mass(calibration.constant_a, &config, *eff);
            assert_eq!(*mass, expected);
        }
    }

    #[test]
    fn all_clipped_sweep_calibrates_to_finite_values() {
        // Degenerate case: every efficiency is zero. All mass bounds clip to
        // the same ceiling, the minimum lands on the first index, and no
        // division produces an infinity.
        let config = SweepConfig::default();
        let sweep = synthetic_sweep(vec![0.0; 10], vec![0.0; 10]);
        let (curves, calibration) = calibrate(&config, &sweep).unwrap();
        assert_eq!(calibration.min_index, 0);
        assert!(calibration.factor1.is_finite() && calibration.factor1 > 0.0);
        assert!(calibration.factor2.is_finite() && calibration.factor2 > 0.0);
        for mass in curves.mass_thermal.iter().chain(curves.mass_dominant.iter()) {
            let expected = config.y_b_obs / (calibration.constant_a * config.eff_floor);
            assert!(mass.is_finite());
            assert_eq!(*mass, expected);
        }
    }

    #[test]
    fn empty_sweep_is_a_calibration_error() {
        let config = SweepConfig::default();
        let sweep = synthetic_sweep(vec![], vec![]);
        let err = calibrate(&config, &sweep).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn anchor_lookup_prefers_nearest_sample() {
        let samples = [1e-5, 9.5e-4, 1.2e-3, 1e-2];
        assert_eq!(nearest_index(&samples, 1e-3).unwrap(), 1);
        // Equidistant neighbors resolve to the lower index.
        let tied = [0.5, 1.5];
        assert_eq!(nearest_index(&tied, 1.0).unwrap(), 0);
    }
}
