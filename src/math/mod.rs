//! Mathematical utilities: sampling grids and modified Bessel functions.

pub mod bessel;
pub mod grid;

pub use bessel::*;
pub use grid::*;
