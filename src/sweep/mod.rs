//! Washout-strength sweep.
//!
//! For each effective-mass sample the washout strength is `K = m_tilde / m*`,
//! and the Boltzmann system is integrated twice: once from a thermal initial
//! abundance and once from a dominant one. The 2 x samples integrations are
//! mutually independent and run on the rayon pool, one task per (sample,
//! scenario) pair; each task owns its output slot, and all tasks are joined
//! before calibration reads anything.
//!
//! Any sample that fails to converge aborts the whole sweep with a
//! diagnostic naming its m_tilde and K; a partially-populated curve is never
//! returned (a single corrupted point would silently distort the
//! calibration anchors downstream).

use rayon::prelude::*;

use crate::domain::{Scenario, SweepConfig, SweepResult};
use crate::error::AppError;
use crate::kinetics::{equilibrium_abundance, integrate_efficiency};
use crate::math::{lin_space, log_space};
use crate::ode::StepControl;

/// The fixed axes of one sweep run, built once up front and never mutated.
#[derive(Debug, Clone)]
pub struct SweepGrids {
    /// Dimensionless-time grid.
    pub z: Vec<f64>,
    /// Effective-mass samples (eV).
    pub m_tilde: Vec<f64>,
    /// Washout strengths, index-aligned to `m_tilde`.
    pub washout: Vec<f64>,
}

/// Build the z / m_tilde / K grids from a validated configuration.
pub fn build_grids(config: &SweepConfig) -> Result<SweepGrids, AppError> {
    let z = lin_space(config.z_min, config.z_max, config.z_steps)?;
    let m_tilde = log_space(config.m_tilde_min, config.m_tilde_max, config.m_tilde_steps)?;
    let washout: Vec<f64> = m_tilde.iter().map(|m| m / config.m_star).collect();
    Ok(SweepGrids { z, m_tilde, washout })
}

/// Run the full sweep: both scenarios across every washout strength.
pub fn run_sweep(config: &SweepConfig) -> Result<SweepResult, AppError> {
    config.validate()?;
    let grids = build_grids(config)?;
    run_sweep_on_grids(config, &grids)
}

/// Run the sweep on prebuilt grids (lets callers reuse the axes).
pub fn run_sweep_on_grids(config: &SweepConfig, grids: &SweepGrids) -> Result<SweepResult, AppError> {
    let n_eq_start = equilibrium_abundance(grids.z[0]);
    if !n_eq_start.is_finite() || n_eq_start <= 0.0 {
        return Err(AppError::domain(format!(
            "Equilibrium abundance at z_min={} is not a positive finite value.",
            grids.z[0]
        )));
    }

    let control = StepControl {
        rtol: config.rtol,
        atol: config.atol,
        max_steps: config.max_steps_per_interval,
    };

    // One task per (sample, scenario); every task is independent and writes
    // only its own slot after the join.
    let samples: Vec<(usize, Scenario)> = (0..grids.m_tilde.len())
        .flat_map(|i| Scenario::ALL.into_iter().map(move |s| (i, s)))
        .collect();

    let results: Vec<Result<(usize, Scenario, f64), AppError>> = samples
        .par_iter()
        .map(|&(i, scenario)| {
            let k = grids.washout[i];
            let n1_init = scenario.initial_abundance(n_eq_start, config);
            integrate_efficiency(k, n1_init, &grids.z, &control)
                .map(|eff| (i, scenario, eff))
                .map_err(|e| {
                    AppError::new(
                        e.exit_code(),
                        format!(
                            "m_tilde={:.6e} (K={:.6e}, {}): {e}",
                            grids.m_tilde[i],
                            k,
                            scenario.display_name()
                        ),
                    )
                })
        })
        .collect();

    // Join barrier: every slot is filled (or the first failure, in sample
    // order, aborts the run).
    let n = grids.m_tilde.len();
    let mut thermal = vec![0.0; n];
    let mut dominant = vec![0.0; n];
    for result in results {
        let (i, scenario, eff) = result?;
        match scenario {
            Scenario::Thermal => thermal[i] = eff,
            Scenario::Dominant => dominant[i] = eff,
        }
    }

    Ok(SweepResult {
        m_tilde: grids.m_tilde.clone(),
        washout: grids.washout.clone(),
        thermal,
        dominant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reduced axes so tests stay quick while keeping the stiff upper decades.
    fn test_config() -> SweepConfig {
        SweepConfig {
            z_steps: 200,
            m_tilde_min: 1e-8,
            m_tilde_max: 1e-1,
            m_tilde_steps: 12,
            ..SweepConfig::default()
        }
    }

    #[test]
    fn grids_are_index_aligned() {
        let config = test_config();
        let grids = build_grids(&config).unwrap();
        assert_eq!(grids.m_tilde.len(), grids.washout.len());
        for (m, k) in grids.m_tilde.iter().zip(grids.washout.iter()) {
            assert!((k - m / config.m_star).abs() <= 1e-15 * k.abs());
        }
    }

    #[test]
    fn sweep_fills_every_slot_with_bounded_values() {
        let config = test_config();
        let result = run_sweep(&config).unwrap();
        assert_eq!(result.thermal.len(), config.m_tilde_steps);
        assert_eq!(result.dominant.len(), config.m_tilde_steps);

        let grids = build_grids(&config).unwrap();
        let n_eq_start = equilibrium_abundance(grids.z[0]);
        for (i, (&t, &d)) in result.thermal.iter().zip(result.dominant.iter()).enumerate() {
            assert!(t.is_finite() && t >= 0.0, "thermal[{i}]");
            assert!(d.is_finite() && d >= 0.0, "dominant[{i}]");
            assert!(t <= n_eq_start * (1.0 + 1e-9));
            assert!(d <= config.dominant_boost * n_eq_start * (1.0 + 1e-9));
        }
    }

    #[test]
    fn sweep_is_deterministic() {
        let config = test_config();
        let a = run_sweep(&config).unwrap();
        let b = run_sweep(&config).unwrap();
        assert_eq!(a.thermal, b.thermal);
        assert_eq!(a.dominant, b.dominant);
    }

    #[test]
    fn failing_sample_aborts_with_its_washout_strength_named() {
        let config = SweepConfig {
            max_steps_per_interval: 1,
            ..test_config()
        };
        let err = run_sweep(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("m_tilde="));
    }
}
