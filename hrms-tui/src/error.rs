use thiserror::Error;

/// Errors that end the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("invalid API configuration: {0}")]
    Client(#[from] hrms_lib::Error),
}
