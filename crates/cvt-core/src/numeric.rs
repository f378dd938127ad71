use crate::CvtError;

/// Floating point type used throughout the simulator.
pub type Real = f64;

/// Absolute/relative tolerance pair used for float comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CvtError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CvtError::NonFinite { what, value: v })
    }
}

/// Sign of `v` with zero mapped to +1.
///
/// Used wherever a magnitude floor must keep the direction of a quantity that
/// may pass through zero.
#[inline]
pub fn sign_or_positive(v: Real) -> Real {
    if v < 0.0 { -1.0 } else { 1.0 }
}

/// Find a root of `f` on `[lo, hi]` by bisection.
///
/// `f(lo)` and `f(hi)` must differ in sign (or one of them be zero). Iterates
/// until the bracket is narrower than `x_tol` or `max_iter` halvings have been
/// made, then returns the midpoint.
pub fn bisect<F>(
    mut f: F,
    mut lo: Real,
    mut hi: Real,
    x_tol: Real,
    max_iter: usize,
    what: &'static str,
) -> Result<Real, CvtError>
where
    F: FnMut(Real) -> Real,
{
    if lo.is_nan() || hi.is_nan() || lo >= hi {
        return Err(CvtError::InvalidArg {
            what: "bisection bracket must satisfy lo < hi",
        });
    }

    let mut f_lo = ensure_finite(f(lo), what)?;
    let f_hi = ensure_finite(f(hi), what)?;

    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(CvtError::NoBracket { what });
    }

    for _ in 0..max_iter {
        let mid = 0.5 * (lo + hi);
        let f_mid = ensure_finite(f(mid), what)?;
        if f_mid == 0.0 {
            return Ok(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
        if hi - lo <= x_tol {
            break;
        }
    }

    Ok(0.5 * (lo + hi))
}
