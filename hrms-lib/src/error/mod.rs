//! Error types

mod api;
mod detail;

pub use api::*;
pub use detail::*;

/// Errors returned by [`HrmsClient`](crate::HrmsClient).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request reached the API (or tried to) and failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Rejected client-side before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The configured base URL cannot be joined with an endpoint path.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Structured error body, when the server sent one.
    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Api(api) => api.detail(),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(api) => api.status_code(),
            _ => None,
        }
    }

    /// Message suitable for an alert.
    ///
    /// Uses `detail`, then `non_field_errors`, then the first message of each
    /// field in `fields`, then `fallback`. Validation errors use their own
    /// text.
    pub fn user_message(&self, fields: &[&str], fallback: &str) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            _ => self
                .detail()
                .and_then(|detail| detail.first_message(fields))
                .unwrap_or(fallback)
                .to_string(),
        }
    }
}
