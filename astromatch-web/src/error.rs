//! Error types for astromatch-web
//!
//! Every failure reaches the client as the same envelope:
//! `{ "error": "<message>" }` with a matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use astromatch_common::Locale;

use crate::checkout::StripeError;
use crate::upstream::UpstreamError;

/// Message returned when checkout is requested without payment credentials
pub const PAYMENT_NOT_CONFIGURED: &str = "Payment provider is not configured";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Conflict (409), e.g. a submission already in flight
    #[error("{0}")]
    Conflict(String),

    /// Upstream answered with a non-success status; body passed through
    #[error("{body}")]
    Upstream { status: u16, body: String },

    /// Upstream unreachable (502)
    #[error("{0}")]
    BadGateway(String),

    /// Upstream did not answer in time (504)
    #[error("Upstream request timed out")]
    Timeout,

    /// Transport failure of a primary call, in the session language
    #[error("{message}")]
    RequestFailed { status: u16, message: &'static str },

    /// Checkout requested without credentials (500)
    #[error("{}", PAYMENT_NOT_CONFIGURED)]
    PaymentNotConfigured,

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// astromatch-common error
    #[error(transparent)]
    Common(#[from] astromatch_common::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::RequestFailed { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::PaymentNotConfigured | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Common(err) => match err {
                astromatch_common::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                astromatch_common::Error::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Swap transport details for the localized failure message
    ///
    /// Upstream statuses and local errors are returned unchanged; the
    /// replaced detail only goes to the log.
    pub fn localized(self, locale: Locale) -> Self {
        match self {
            ApiError::BadGateway(_) | ApiError::Timeout => {
                let status = self.status().as_u16();
                tracing::error!(status, "Upstream unavailable: {}", self);
                ApiError::RequestFailed {
                    status,
                    message: locale.request_failed(),
                }
            }
            other => other,
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, body } => ApiError::Upstream { status, body },
            UpstreamError::Timeout => ApiError::Timeout,
            UpstreamError::Network(msg) => ApiError::BadGateway(msg),
            UpstreamError::Parse(msg) => ApiError::BadGateway(msg),
        }
    }
}

impl From<StripeError> for ApiError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Authentication(_) => ApiError::PaymentNotConfigured,
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
