use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use skin_nova_domain::services::ServiceError;

/// Error response format for the API
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

/// Result type returned by handlers
pub type ApiResult<T> = Result<T, ErrorResponse>;

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn validation_error(message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self {
            details,
            ..Self::new("validation_error", message)
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("forbidden", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("conflict", message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new("payload_too_large", message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new("service_unavailable", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "conflict" => StatusCode::CONFLICT,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ServiceError> for ErrorResponse {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ErrorResponse::bad_request(msg),
            ServiceError::Unauthorized(msg) => ErrorResponse::unauthorized(msg),
            ServiceError::Forbidden(msg) => ErrorResponse::forbidden(msg),
            ServiceError::NotFound(msg) => ErrorResponse::not_found(msg),
            ServiceError::Conflict(msg) => ErrorResponse::conflict(msg),
            ServiceError::PayloadTooLarge(msg) => ErrorResponse::payload_too_large(msg),
            ServiceError::Mail(msg) => {
                error!("Mail delivery failed: {}", msg);
                ErrorResponse::internal_error(msg)
            }
            ServiceError::Repository(msg) | ServiceError::Internal(msg) => {
                error!("Request failed: {}", msg);
                ErrorResponse::internal_error("An unexpected error occurred")
            }
        }
    }
}

impl From<ValidationErrors> for ErrorResponse {
    fn from(errors: ValidationErrors) -> Self {
        warn!("Request validation failed: {}", errors);
        ErrorResponse::validation_error("Invalid request", serde_json::to_value(&errors).ok())
    }
}

impl From<MultipartError> for ErrorResponse {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ErrorResponse::payload_too_large("File too large")
        } else {
            ErrorResponse::bad_request(err.body_text())
        }
    }
}

/// Run `validator` rules on a request payload
pub fn validate_request<T: Validate>(request: &T) -> ApiResult<()> {
    request.validate().map_err(ErrorResponse::from)
}
