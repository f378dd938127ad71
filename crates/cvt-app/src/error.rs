//! Error types for the cvt-app service layer.

/// Application error type that wraps errors from the backend crates
/// behind one interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Model construction failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cvt-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<cvt_project::ProjectError> for AppError {
    fn from(err: cvt_project::ProjectError) -> Self {
        match err {
            cvt_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<cvt_project::ValidationError> for AppError {
    fn from(err: cvt_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<cvt_models::ModelError> for AppError {
    fn from(err: cvt_models::ModelError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<cvt_sim::SimError> for AppError {
    fn from(err: cvt_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<cvt_results::ResultsError> for AppError {
    fn from(err: cvt_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}
