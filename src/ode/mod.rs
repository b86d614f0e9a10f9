//! Adaptive ODE integration.
//!
//! Responsibilities:
//!
//! - embedded Cash-Karp Runge-Kutta 4(5) stepping with error control
//! - a hard internal step ceiling per advance (no silent truncation)

pub mod cash_karp;

pub use cash_karp::*;
