//! cvt-core: shared foundation for the CVT simulator.
//!
//! Contains:
//! - units (uom conversions between shop units and SI, physical constants)
//! - numeric (Real, tolerances, bisection, float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CvtError, CvtResult};
pub use numeric::*;
pub use units::*;
