//! Core types for rowcast.
//!
//! This module contains the value types a driver reports for one cell.

mod complex;
mod scalar;

pub use complex::Complex;
pub use scalar::{ScalarValue, UnsupportedKind};
