//! API error handling.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use agora_core::error::AgoraError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
    retry_after: Option<u64>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            retry_after: None,
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message, "VALIDATION_ERROR")
    }

    /// Rate limit exceeded; sets `Retry-After`.
    pub fn too_many_requests(message: impl Into<String>, retry_after_secs: u64) -> Self {
        Self {
            retry_after: Some(retry_after_secs),
            ..Self::new(StatusCode::TOO_MANY_REQUESTS, message, "RATE_LIMITED")
        }
    }

    /// Feature switched off or dependency unavailable.
    pub fn service_unavailable(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message, code)
    }

    /// Upstream provider failure.
    pub fn bad_gateway(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message, code)
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Code and message of a failed request.
#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl From<&ApiError> for ErrorBody {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.code.clone(),
            message: err.message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retry_after = self.retry_after;
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };

        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<AgoraError> for ApiError {
    fn from(err: AgoraError) -> Self {
        match &err {
            AgoraError::EmptyText
            | AgoraError::TextTooLong { .. }
            | AgoraError::ValidationError(_) => ApiError::validation(err.to_string()),
            AgoraError::UnsupportedLanguage(_)
            | AgoraError::InvalidTargetLanguage(_)
            | AgoraError::InvalidContentHash(_) => ApiError::bad_request(err.to_string()),
            AgoraError::HexError(_) => {
                ApiError::bad_request(format!("Invalid hex encoding: {}", err))
            }
            AgoraError::CacheEntryNotFound(_) => ApiError::not_found(err.to_string()),
            AgoraError::CacheDisabled => {
                ApiError::service_unavailable(err.to_string(), "CACHE_DISABLED")
            }
            AgoraError::RateLimited { retry_after_secs } => {
                ApiError::too_many_requests(err.to_string(), *retry_after_secs)
            }
            AgoraError::ProviderUnavailable(_)
            | AgoraError::ConnectionTimeout(_)
            | AgoraError::HttpError(_) => {
                tracing::warn!(error = %err, "Translation provider unavailable");
                ApiError::bad_gateway(err.to_string(), "PROVIDER_UNAVAILABLE")
            }
            AgoraError::TranslationFailed(_) => {
                ApiError::bad_gateway(err.to_string(), "TRANSLATION_FAILED")
            }
            _ => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}
