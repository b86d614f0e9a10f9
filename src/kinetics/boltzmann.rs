//! The two-state Boltzmann system and its efficiency integral.
//!
//! State is `(N_N1, N_B)`: the heavy-neutrino comoving abundance and the
//! generated asymmetry. The coupled system is
//!
//! ```text
//! dN_N1/dz = -D(z,K) (N_N1 - N_eq(z))
//! dN_B/dz  = -D(z,K) (N_N1 - N_eq(z)) - W(z,K) N_B
//! ```
//!
//! integrated across the fixed z-grid. Only |N_B| at the final grid point
//! matters (the efficiency factor); intermediate N_B may go negative.

use nalgebra::Vector2;

use crate::error::AppError;
use crate::kinetics::rates::rate_point;
use crate::ode::{CashKarp, StepControl};

/// The Boltzmann right-hand side for one washout strength.
#[derive(Debug, Clone, Copy)]
pub struct BoltzmannSystem {
    washout_strength: f64,
}

impl BoltzmannSystem {
    pub fn new(washout_strength: f64) -> Self {
        Self { washout_strength }
    }

    /// Evaluate `(dN_N1/dz, dN_B/dz)` at `(z, y)`.
    pub fn derivatives(&self, z: f64, y: Vector2<f64>) -> Vector2<f64> {
        let r = rate_point(z, self.washout_strength);
        let source = r.decay * (y[0] - r.n_eq);
        Vector2::new(-source, -source - r.washout * y[1])
    }
}

/// Integrate one `(K, initial condition)` sample over the z-grid and return
/// the efficiency factor `|N_B(z_max)|`.
///
/// The step ceiling applies per grid interval; exhausting it (or losing the
/// state to non-finite values) fails the sample instead of returning an
/// unconverged number.
pub fn integrate_efficiency(
    washout_strength: f64,
    n1_init: f64,
    z_grid: &[f64],
    control: &StepControl,
) -> Result<f64, AppError> {
    if z_grid.len() < 2 {
        return Err(AppError::domain("z grid needs at least 2 points."));
    }
    if !n1_init.is_finite() || n1_init < 0.0 {
        return Err(AppError::domain(format!(
            "Initial abundance must be finite and non-negative; got {n1_init}."
        )));
    }

    let system = BoltzmannSystem::new(washout_strength);
    let mut stepper = CashKarp::new(control.clone());
    let mut state = Vector2::new(n1_init, 0.0);

    for w in z_grid.windows(2) {
        state = stepper.advance(|z, y| system.derivatives(z, y), w[0], w[1], state)?;
        if !state.iter().all(|v| v.is_finite()) {
            return Err(AppError::integration(format!(
                "Non-finite state after z={:.6}.",
                w[1]
            )));
        }
    }

    Ok(state[1].abs())
}
