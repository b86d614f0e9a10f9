//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the sweep and calibration
//! - exported to JSON for the external plotting collaborator
//!
//! All constants live in `SweepConfig` and are passed by reference into the
//! sweep and the calibrator; nothing reads them from ambient globals. The
//! config is built once, validated once, and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Initial-condition scenario for the heavy-neutrino abundance.
///
/// "Thermal" starts the abundance at its equilibrium value; "dominant"
/// starts it at a large multiple of equilibrium, modeling a universe whose
/// energy density is dominated by the heavy neutrino before decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Thermal,
    Dominant,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Thermal, Scenario::Dominant];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Scenario::Thermal => "thermal N1",
            Scenario::Dominant => "dominant N1",
        }
    }

    /// Initial abundance for this scenario given the equilibrium abundance
    /// at the start of the z-grid.
    pub fn initial_abundance(self, n_eq_start: f64, config: &SweepConfig) -> f64 {
        match self {
            Scenario::Thermal => n_eq_start,
            Scenario::Dominant => config.dominant_boost * n_eq_start,
        }
    }
}

/// A full run's configuration.
///
/// Field values carry the units of the physical pipeline: effective masses
/// in eV, mass bounds in GeV, z dimensionless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Dimensionless-time grid start (mass over temperature). Must be > 0;
    /// the Bessel kernels are singular at z = 0.
    pub z_min: f64,
    /// Dimensionless-time grid end.
    pub z_max: f64,
    /// Number of z-grid points.
    pub z_steps: usize,

    /// Effective-neutrino-mass grid start (eV).
    pub m_tilde_min: f64,
    /// Effective-neutrino-mass grid end (eV).
    pub m_tilde_max: f64,
    /// Number of m-tilde samples (one washout strength each).
    pub m_tilde_steps: usize,

    /// Equilibrium neutrino mass scale m* (eV); K = m_tilde / m*.
    pub m_star: f64,
    /// Abundance multiplier for the dominant scenario.
    pub dominant_boost: f64,

    /// Observed baryon asymmetry.
    pub y_b_obs: f64,
    /// Reference energy scale v entering the prefactor (GeV).
    pub v_ew: f64,
    /// Atmospheric mass-squared splitting (eV^2).
    pub m_atm_ev2: f64,
    /// eV-to-GeV conversion applied to the splitting inside the prefactor.
    pub ev_to_gev: f64,

    /// Floor applied to efficiency values before any division.
    pub eff_floor: f64,

    /// ODE solver relative tolerance.
    pub rtol: f64,
    /// ODE solver absolute tolerance.
    pub atol: f64,
    /// Internal step ceiling per z-grid interval. Doubles as the per-sample
    /// timeout bound: exhausting it fails the sample rather than returning
    /// an unconverged value.
    pub max_steps_per_interval: usize,

    /// Pass-1 anchor: the minimum of the thermal mass curve is pinned to
    /// this mass (GeV).
    pub mass_anchor: f64,
    /// Pass-2 anchor location on the m-tilde axis (eV).
    pub anchor_m_tilde: f64,
    /// Pass-2 anchor: thermal efficiency value at the anchor location.
    pub anchor_efficiency: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            z_min: 0.1,
            z_max: 20.0,
            z_steps: 1000,
            m_tilde_min: 1e-10,
            m_tilde_max: 1.0,
            m_tilde_steps: 100,
            m_star: 1e-3,
            dominant_boost: 100.0,
            y_b_obs: 6e-10,
            v_ew: 246.0,
            m_atm_ev2: 2.5e-3,
            ev_to_gev: 1.602e-9,
            eff_floor: 1e-30,
            rtol: 1e-8,
            atol: 1e-10,
            max_steps_per_interval: 10_000,
            mass_anchor: 1e9,
            anchor_m_tilde: 1e-3,
            anchor_efficiency: 0.1,
        }
    }
}

impl SweepConfig {
    /// Validate the configuration before any grid is built.
    ///
    /// This is the enforcement point for the numeric domain: a z-grid
    /// touching zero (or any non-positive scale) is rejected here rather
    /// than surfacing later as NaN deep inside an integration.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.z_min.is_finite() && self.z_min > 0.0) {
            return Err(AppError::domain(format!(
                "z grid must start above 0 (Bessel kernels are singular at z=0); got z_min={}",
                self.z_min
            )));
        }
        if !(self.z_max.is_finite() && self.z_max > self.z_min) {
            return Err(AppError::domain(format!(
                "z grid must satisfy z_max > z_min; got [{}, {}]",
                self.z_min, self.z_max
            )));
        }
        if self.z_steps < 2 {
            return Err(AppError::domain("z grid needs at least 2 points."));
        }
        if !(self.m_tilde_min > 0.0 && self.m_tilde_max > self.m_tilde_min) {
            return Err(AppError::domain(format!(
                "m_tilde grid must satisfy 0 < min < max; got [{}, {}]",
                self.m_tilde_min, self.m_tilde_max
            )));
        }
        if self.m_tilde_steps < 2 {
            return Err(AppError::domain("m_tilde grid needs at least 2 samples."));
        }
        if !(self.m_star.is_finite() && self.m_star > 0.0) {
            return Err(AppError::domain("m_star must be a positive finite scale."));
        }
        if !(self.dominant_boost.is_finite() && self.dominant_boost > 0.0) {
            return Err(AppError::domain("dominant_boost must be positive."));
        }
        if !(self.y_b_obs > 0.0 && self.v_ew > 0.0 && self.m_atm_ev2 > 0.0 && self.ev_to_gev > 0.0) {
            return Err(AppError::domain(
                "Physical constants (y_b_obs, v_ew, m_atm_ev2, ev_to_gev) must be positive.",
            ));
        }
        if !(self.eff_floor.is_finite() && self.eff_floor > 0.0) {
            return Err(AppError::domain("Efficiency floor must be positive."));
        }
        if !(self.rtol > 0.0 && self.atol > 0.0) {
            return Err(AppError::domain("Solver tolerances must be positive."));
        }
        if self.max_steps_per_interval == 0 {
            return Err(AppError::domain("Step ceiling must be at least 1."));
        }
        if !(self.mass_anchor > 0.0 && self.anchor_m_tilde > 0.0 && self.anchor_efficiency > 0.0) {
            return Err(AppError::domain("Calibration anchors must be positive."));
        }
        Ok(())
    }
}

/// Raw sweep output: one efficiency value per m-tilde sample and scenario,
/// index-aligned to the m-tilde grid, before any calibration.
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    /// Effective-mass samples (eV).
    pub m_tilde: Vec<f64>,
    /// Washout strengths K = m_tilde / m*, index-aligned.
    pub washout: Vec<f64>,
    /// |N_B(z_max)| for the thermal scenario.
    pub thermal: Vec<f64>,
    /// |N_B(z_max)| for the dominant scenario.
    pub dominant: Vec<f64>,
}

/// Diagnostics of the two calibration passes.
///
/// Both passes derive their factor from the thermal curve and apply it to
/// both curves; the dominant curve shares the thermal normalization.
#[derive(Debug, Clone, Serialize)]
pub struct Calibration {
    /// Analytic prefactor A relating efficiency to required mass.
    pub constant_a: f64,
    /// Pass 1 scale factor (min thermal mass over the mass anchor).
    pub factor1: f64,
    /// Index of the thermal mass curve minimum (lowest index on ties).
    pub min_index: usize,
    /// Thermal mass at `min_index` after pass 1; equals the mass anchor up
    /// to rounding.
    pub mass_at_min_after_pass1: f64,
    /// Pass 2 scale factor (anchor efficiency over thermal efficiency at
    /// the anchor sample).
    pub factor2: f64,
    /// Index of the m-tilde sample nearest the pass-2 anchor.
    pub anchor_index: usize,
    /// Thermal efficiency at `anchor_index` after pass 2; equals the anchor
    /// efficiency up to rounding.
    pub eff_at_anchor: f64,
}

/// Final calibrated curves, index-aligned to the m-tilde grid.
///
/// This is the read-only hand-off surface for plotting: efficiency pair and
/// mass-bound pair, all length `m_tilde.len()`.
#[derive(Debug, Clone, Serialize)]
pub struct CalibratedCurves {
    pub m_tilde: Vec<f64>,
    pub eff_thermal: Vec<f64>,
    pub eff_dominant: Vec<f64>,
    pub mass_thermal: Vec<f64>,
    pub mass_dominant: Vec<f64>,
}

/// A curve hand-off file (JSON).
#[derive(Debug, Clone, Serialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated: String,
    pub config: SweepConfig,
    pub calibration: Calibration,
    pub curves: CalibratedCurves,
}
