//! Error types for physical model construction and evaluation.

use cvt_core::error::CvtError;
use thiserror::Error;

/// Errors raised by the drivetrain models.
///
/// Every variant indicates a configuration bug rather than a transient
/// condition; callers never retry on these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("x = {x} is outside the ramp domain [{min}, {max}]")]
    Domain { x: f64, min: f64, max: f64 },

    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl ModelError {
    pub fn config(what: impl Into<String>) -> Self {
        ModelError::Configuration { what: what.into() }
    }
}

impl From<CvtError> for ModelError {
    fn from(e: CvtError) -> Self {
        match e {
            CvtError::NonFinite { what, .. } => ModelError::NonPhysical { what },
            CvtError::InvalidArg { what } => ModelError::InvalidArg { what },
            other => ModelError::Configuration {
                what: other.to_string(),
            },
        }
    }
}
