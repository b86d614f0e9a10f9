//! Sampling grid generation.
//!
//! Both grids are fixed before any integration begins and never mutate:
//!
//! - the dimensionless-time axis is linearly spaced
//! - the effective-mass axis is logarithmically spaced (it spans ten decades)
//!
//! Grid construction is the single place where axis ranges are validated, so
//! downstream evaluation can assume strictly positive, finite, ordered inputs.

use crate::error::AppError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::domain(format!(
            "Invalid log grid range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::domain("Log grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

/// Generate `steps` linearly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::domain(format!(
            "Invalid linear grid range: min={min}, max={max} (must be finite and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::domain("Linear grid steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(min + step * i as f64);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(1e-10, 1.0, 100).unwrap();
        assert_eq!(v.len(), 100);
        assert!((v[0] - 1e-10).abs() < 1e-22);
        assert!((v[99] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn log_space_is_strictly_increasing() {
        let v = log_space(1e-10, 1.0, 100).unwrap();
        for w in v.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(0.1, 20.0, 1000).unwrap();
        assert_eq!(v.len(), 1000);
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[999] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_degenerate_ranges() {
        assert!(log_space(0.0, 1.0, 10).is_err());
        assert!(log_space(1.0, 1.0, 10).is_err());
        assert!(lin_space(2.0, 1.0, 10).is_err());
        assert!(lin_space(0.1, 20.0, 1).is_err());
    }
}
