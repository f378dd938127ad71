use thiserror::Error;

pub type CvtResult<T> = Result<T, CvtError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CvtError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Bisection failed to bracket a root for {what}")]
    NoBracket { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
