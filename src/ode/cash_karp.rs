//! Embedded Cash-Karp Runge-Kutta 4(5) with adaptive step control.
//!
//! The kinetic system is mildly stiff for large washout strengths (the decay
//! rate grows like K*z), so the stepper must shrink far below the output
//! spacing in that regime. Implementation choices:
//!
//! - Cash-Karp coefficients; the embedded 4th-order solution provides the
//!   local error estimate at no extra function evaluations.
//! - Mixed error norm `|e_i| / (atol + rtol * max(|y_i|, |y_i'|))`, accepted
//!   when the worst component ratio is <= 1.
//! - Proportional control: safety 0.9, growth exponent -1/5 on accept,
//!   -1/4 on reject, step ratio clamped to [0.1, 5.0].
//! - A non-finite trial state counts as a rejected step (the ratio becomes
//!   infinite and the step shrinks hard), so a transient overflow recovers
//!   instead of poisoning the result.
//! - Exhausting the step ceiling or underflowing the step size is an error;
//!   an unconverged state is never returned.

use nalgebra::Vector2;

use crate::error::AppError;

/// Solver tolerances and the per-advance step ceiling.
#[derive(Debug, Clone)]
pub struct StepControl {
    pub rtol: f64,
    pub atol: f64,
    /// Maximum internal attempts (accepted + rejected) per `advance` call.
    pub max_steps: usize,
}

const SAFETY: f64 = 0.9;
const MAX_GROW: f64 = 5.0;
const MIN_SHRINK: f64 = 0.1;

// Cash-Karp tableau.
const A2: f64 = 0.2;
const A3: f64 = 0.3;
const A4: f64 = 0.6;
const A5: f64 = 1.0;
const A6: f64 = 0.875;

const B21: f64 = 0.2;
const B31: f64 = 3.0 / 40.0;
const B32: f64 = 9.0 / 40.0;
const B41: f64 = 0.3;
const B42: f64 = -0.9;
const B43: f64 = 1.2;
const B51: f64 = -11.0 / 54.0;
const B52: f64 = 2.5;
const B53: f64 = -70.0 / 27.0;
const B54: f64 = 35.0 / 27.0;
const B61: f64 = 1631.0 / 55296.0;
const B62: f64 = 175.0 / 512.0;
const B63: f64 = 575.0 / 13824.0;
const B64: f64 = 44275.0 / 110592.0;
const B65: f64 = 253.0 / 4096.0;

// 5th-order weights.
const C1: f64 = 37.0 / 378.0;
const C3: f64 = 250.0 / 621.0;
const C4: f64 = 125.0 / 594.0;
const C6: f64 = 512.0 / 1771.0;

// Difference against the embedded 4th-order weights (error estimate).
const DC1: f64 = C1 - 2825.0 / 27648.0;
const DC3: f64 = C3 - 18575.0 / 48384.0;
const DC4: f64 = C4 - 13525.0 / 55296.0;
const DC5: f64 = -277.0 / 14336.0;
const DC6: f64 = C6 - 0.25;

/// Adaptive stepper for a 2-state system.
///
/// The accepted step size is carried across `advance` calls, so marching a
/// fine output grid does not restart the controller at every grid point.
#[derive(Debug, Clone)]
pub struct CashKarp {
    control: StepControl,
    h_next: Option<f64>,
}

impl CashKarp {
    pub fn new(control: StepControl) -> Self {
        Self {
            control,
            h_next: None,
        }
    }

    /// Integrate `y' = f(z, y)` from `z0` to `z1` (with `z1 > z0`).
    ///
    /// Returns the state at `z1`, or an error if the step ceiling is
    /// exhausted or the step size underflows before reaching it.
    pub fn advance<F>(&mut self, f: F, z0: f64, z1: f64, y0: Vector2<f64>) -> Result<Vector2<f64>, AppError>
    where
        F: Fn(f64, Vector2<f64>) -> Vector2<f64>,
    {
        let span = z1 - z0;
        if !(span.is_finite() && span > 0.0) {
            return Err(AppError::domain(format!(
                "Integration interval must be increasing and finite; got [{z0}, {z1}]."
            )));
        }

        let mut z = z0;
        let mut y = y0;
        let mut h = self.h_next.unwrap_or(span).min(span);
        let mut steps = 0usize;
        let tiny = f64::EPSILON * z1.abs().max(1.0);

        while z1 - z > tiny {
            if steps >= self.control.max_steps {
                return Err(AppError::integration(format!(
                    "Step ceiling ({}) exhausted in [{z0:.6}, {z1:.6}] at z={z:.6}.",
                    self.control.max_steps
                )));
            }
            if h < tiny {
                return Err(AppError::integration(format!(
                    "Step size underflow at z={z:.6} in [{z0:.6}, {z1:.6}]."
                )));
            }

            h = h.min(z1 - z);
            let (y_trial, ratio) = self.try_step(&f, z, y, h);
            steps += 1;

            if ratio <= 1.0 {
                z += h;
                y = y_trial;
                let grow = if ratio > 0.0 {
                    SAFETY * ratio.powf(-0.2)
                } else {
                    MAX_GROW
                };
                h *= grow.clamp(MIN_SHRINK, MAX_GROW);
            } else {
                // Rejected; powf(-0.25) maps an infinite ratio to 0, which
                // the clamp turns into the hard shrink.
                h *= (SAFETY * ratio.powf(-0.25)).clamp(MIN_SHRINK, 1.0);
            }
        }

        self.h_next = Some(h);
        Ok(y)
    }

    /// One trial step; returns the 5th-order state and the worst-component
    /// error ratio (<= 1 means accept).
    fn try_step<F>(&self, f: &F, z: f64, y: Vector2<f64>, h: f64) -> (Vector2<f64>, f64)
    where
        F: Fn(f64, Vector2<f64>) -> Vector2<f64>,
    {
        let k1 = f(z, y);
        let k2 = f(z + A2 * h, y + k1 * (B21 * h));
        let k3 = f(z + A3 * h, y + k1 * (B31 * h) + k2 * (B32 * h));
        let k4 = f(z + A4 * h, y + k1 * (B41 * h) + k2 * (B42 * h) + k3 * (B43 * h));
        let k5 = f(
            z + A5 * h,
            y + k1 * (B51 * h) + k2 * (B52 * h) + k3 * (B53 * h) + k4 * (B54 * h),
        );
        let k6 = f(
            z + A6 * h,
            y + k1 * (B61 * h) + k2 * (B62 * h) + k3 * (B63 * h) + k4 * (B64 * h) + k5 * (B65 * h),
        );

        let y_next = y + (k1 * C1 + k3 * C3 + k4 * C4 + k6 * C6) * h;
        let err = (k1 * DC1 + k3 * DC3 + k4 * DC4 + k5 * DC5 + k6 * DC6) * h;

        let mut ratio = 0.0f64;
        for i in 0..2 {
            let scale = self.control.atol + self.control.rtol * y[i].abs().max(y_next[i].abs());
            let component = (err[i] / scale).abs();
            ratio = ratio.max(component);
        }
        if !ratio.is_finite() || !y_next.iter().all(|v| v.is_finite()) {
            ratio = f64::INFINITY;
        }

        (y_next, ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> StepControl {
        StepControl {
            rtol: 1e-8,
            atol: 1e-10,
            max_steps: 10_000,
        }
    }

    #[test]
    fn exponential_decay_matches_analytic_solution() {
        // y' = -y, both components; y(2) = e^-2 * y(0).
        let mut stepper = CashKarp::new(control());
        let mut y = Vector2::new(1.0, 3.0);
        let grid: Vec<f64> = (0..=20).map(|i| 0.1 * i as f64).collect();
        for w in grid.windows(2) {
            y = stepper.advance(|_, y| -y, w[0], w[1], y).unwrap();
        }
        let expected = (-2.0f64).exp();
        assert!((y[0] - expected).abs() < 1e-7);
        assert!((y[1] - 3.0 * expected).abs() < 1e-7);
    }

    #[test]
    fn zero_rhs_is_stationary() {
        let mut stepper = CashKarp::new(control());
        let y = stepper
            .advance(|_, _| Vector2::zeros(), 0.0, 5.0, Vector2::new(2.5, -1.0))
            .unwrap();
        assert_eq!(y, Vector2::new(2.5, -1.0));
    }

    #[test]
    fn stiff_decay_converges_within_ceiling() {
        // Fast relaxation to a constant: y' = -1000 (y - 1).
        let mut stepper = CashKarp::new(control());
        let mut y = Vector2::new(5.0, 0.0);
        let grid: Vec<f64> = (0..=50).map(|i| 0.02 * i as f64).collect();
        for w in grid.windows(2) {
            y = stepper
                .advance(
                    |_, y| Vector2::new(-1000.0 * (y[0] - 1.0), -1000.0 * y[1]),
                    w[0],
                    w[1],
                    y,
                )
                .unwrap();
        }
        assert!((y[0] - 1.0).abs() < 1e-6);
        assert!(y[1].abs() < 1e-6);
    }

    #[test]
    fn step_ceiling_exhaustion_is_an_error() {
        let mut stepper = CashKarp::new(StepControl {
            rtol: 1e-12,
            atol: 1e-14,
            max_steps: 3,
        });
        let err = stepper
            .advance(
                |z, _| Vector2::new((10.0 * z).sin() * 100.0, (7.0 * z).cos() * 100.0),
                0.0,
                50.0,
                Vector2::zeros(),
            )
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn rejects_degenerate_interval() {
        let mut stepper = CashKarp::new(control());
        assert!(stepper
            .advance(|_, y| y, 1.0, 1.0, Vector2::zeros())
            .is_err());
    }
}
