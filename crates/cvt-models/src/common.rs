//! Common utilities for model calculations.

use crate::error::{ModelError, ModelResult};
use cvt_core::numeric::ensure_finite;

/// Tolerance used when checking segment contiguity (m).
pub const EPSILON_LENGTH: f64 = 1e-12;

/// Ensure a value is finite, returning ModelError if not.
pub fn check_finite(value: f64, what: &'static str) -> ModelResult<f64> {
    ensure_finite(value, what).map_err(|_| ModelError::NonPhysical { what })
}

/// Ensure a parameter is strictly positive and finite.
pub fn check_positive(value: f64, what: &'static str) -> ModelResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ModelError::InvalidArg { what });
    }
    Ok(value)
}

/// Ensure a parameter is non-negative and finite.
pub fn check_non_negative(value: f64, what: &'static str) -> ModelResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::InvalidArg { what });
    }
    Ok(value)
}

/// Saturate a shift distance into `[0, max_shift]`.
#[inline]
pub fn clamp_shift(shift: f64, max_shift: f64) -> f64 {
    shift.clamp(0.0, max_shift)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_shift() {
        assert_eq!(clamp_shift(0.01, 0.02), 0.01);
        assert_eq!(clamp_shift(-1.0, 0.02), 0.0);
        assert_eq!(clamp_shift(1.0, 0.02), 0.02);
    }

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_check_positive() {
        assert!(check_positive(1.0, "mass").is_ok());
        assert!(check_positive(0.0, "mass").is_err());
        assert!(check_non_negative(0.0, "preload").is_ok());
        assert!(check_non_negative(-0.1, "preload").is_err());
    }
}
