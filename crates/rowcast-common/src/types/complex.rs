//! Complex number pair.

use serde::{Deserialize, Serialize};

/// A complex number with real and imaginary components.
///
/// Drivers rarely report these, but the value model keeps them so a
/// complex cell converts instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex<T> {
    /// Real component.
    pub re: T,
    /// Imaginary component.
    pub im: T,
}

impl<T> Complex<T> {
    /// Creates a complex number.
    #[inline]
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl Complex<f32> {
    /// Widens both components to double precision.
    #[inline]
    #[must_use]
    pub fn widen(self) -> Complex<f64> {
        Complex::new(f64::from(self.re), f64::from(self.im))
    }
}
