//! Process-level error type.
//!
//! Every fatal condition carries the exit code the binary should terminate
//! with, plus a human-readable diagnostic. There is no partial-result mode:
//! either the full pair of curves is produced, or the run aborts here.
//!
//! Exit code map:
//! - 2: invalid configuration or numeric-domain violation (e.g. a z-grid
//!   touching zero, where the Bessel kernels are undefined)
//! - 3: the ODE solver could not meet tolerance within its step ceiling
//! - 4: calibration could not locate its anchors

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Invalid configuration or a numeric-domain violation.
    pub fn domain(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// ODE integration failed to converge for a sample.
    pub fn integration(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Calibration anchor lookup failed.
    pub fn calibration(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
