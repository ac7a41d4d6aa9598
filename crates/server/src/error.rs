use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use clientele_core::domain::customer::INVALID_ID_MESSAGE;
use clientele_core::errors::{CustomerError, InterfaceError};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

pub const MALFORMED_BODY_MESSAGE: &str = "Malformed JSON request.";
pub const UNSUPPORTED_MEDIA_MESSAGE: &str = "Content-Type must be application/json.";

/// Uniform error body for every failed request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorBody {
    /// RFC 3339 time the error was produced.
    #[schema(example = "2026-01-01T12:00:00+00:00")]
    pub timestamp: String,
    /// HTTP reason phrase.
    #[schema(example = "Bad Request")]
    pub error: String,
    #[schema(example = "Validation failed.")]
    pub message: String,
    #[schema(example = json!(["Email is required."]))]
    pub details: Vec<String>,
}

#[derive(Debug)]
pub enum ApiError {
    Interface(InterfaceError),
    /// Request rejected by the framework before it reached a handler's logic.
    Rejected { status: StatusCode, message: String, details: Vec<String> },
}

impl From<CustomerError> for ApiError {
    fn from(value: CustomerError) -> Self {
        if let CustomerError::Unexpected(cause) = &value {
            error!(
                event_name = "api.internal_error",
                cause = %cause,
                "request failed unexpectedly"
            );
        }
        Self::Interface(InterfaceError::from(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                Self::Interface(InterfaceError::BadRequest {
                    message: MALFORMED_BODY_MESSAGE.to_string(),
                    details: vec![rejection.body_text()],
                })
            }
            JsonRejection::MissingJsonContentType(_) => Self::Rejected {
                status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
                message: UNSUPPORTED_MEDIA_MESSAGE.to_string(),
                details: vec![rejection.body_text()],
            },
            other => Self::Rejected {
                status: other.status(),
                message: other.body_text(),
                details: Vec::new(),
            },
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Interface(InterfaceError::BadRequest {
            message: INVALID_ID_MESSAGE.to_string(),
            details: vec![rejection.body_text()],
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, details) = match self {
            Self::Interface(interface) => {
                let status = StatusCode::from_u16(interface.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = interface.message().to_string();
                let details = interface.details().to_vec();
                (status, interface.label(), message, details)
            }
            Self::Rejected { status, message, details } => {
                (status, status.canonical_reason().unwrap_or("Error"), message, details)
            }
        };

        let body = ErrorBody {
            timestamp: Utc::now().to_rfc3339(),
            error: error.to_string(),
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}
