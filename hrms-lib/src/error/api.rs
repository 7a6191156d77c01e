//! API error types

use std::time::Duration;

use super::ErrorDetail;

/// Errors that can occur during API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the API.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        /// Raw response body, or the status reason when empty.
        message: String,
        /// Parsed error body, if the server sent JSON.
        detail: Option<Box<ErrorDetail>>,
    },

    /// Network error during API call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Failed to parse API response.
    #[error("Response parse error: {message}")]
    Parse {
        message: String,
        body: Option<String>,
    },
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn http_with_detail(status: u16, message: impl Into<String>, detail: ErrorDetail) -> Self {
        Self::Http {
            status,
            message: message.into(),
            detail: Some(Box::new(detail)),
        }
    }

    /// Build an HTTP error from a response body, parsing it when possible.
    pub fn from_body(status: u16, body: String) -> Self {
        match ErrorDetail::parse(&body) {
            Some(detail) => Self::http_with_detail(status, body, detail),
            None => Self::http(status, body),
        }
    }

    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Parse { .. } => false,
        }
    }
}
