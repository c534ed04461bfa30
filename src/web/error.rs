//! Error responses of the HTTP API.
//!
//! Every failure is rendered as `{"error": {"code", "message", "details"?}}`.
//! [`HttpBlobApi`](crate::client::HttpBlobApi) reads `message` back out of that
//! envelope, so the shape is part of the wire contract.

use std::collections::BTreeMap;
use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tokio::task::JoinError;
use validator::ValidationErrors;

use crate::FilesysError;

/// Machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The body is not the JSON the endpoint expects.
    BadRequest,
    /// The body was not sent as `application/json`.
    UnsupportedMediaType,
    /// Nothing lives at the requested path.
    NotFound,
    /// The target name is already taken.
    Conflict,
    /// Well-formed request naming an unacceptable path or entry name.
    ValidationError,
    InternalError,
}

impl ErrorCode {
    /// HTTP status sent with this code.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Field name to messages, for bodies that failed validation.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// An error the API answers with.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<FieldErrors>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    error: Detail<'a>,
}

#[derive(Serialize)]
struct Detail<'a> {
    code: ErrorCode,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a FieldErrors>,
}

impl ApiError {
    /// Error with a code and a message shown to the caller.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Per-field messages of a validation failure.
    pub fn details(&self) -> Option<&FieldErrors> {
        self.details.as_ref()
    }

    /// Opaque 500; the cause is logged, never sent.
    fn internal(cause: &dyn fmt::Display) -> Self {
        tracing::error!(error = %cause, "Request failed");
        Self::new(ErrorCode::InternalError, "An internal error occurred")
    }
}

impl From<FilesysError> for ApiError {
    fn from(err: FilesysError) -> Self {
        match err {
            FilesysError::NotFound(_) => Self::new(ErrorCode::NotFound, err.to_string()),
            FilesysError::Conflict(_) => Self::new(ErrorCode::Conflict, err.to_string()),
            FilesysError::Validation(msg) => Self::new(ErrorCode::ValidationError, msg),
            other => Self::internal(&other),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| format!("invalid {field}"), |m| m.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        Self {
            code: ErrorCode::ValidationError,
            message: "Request validation failed".to_string(),
            details: Some(details),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let code = match &rejection {
            JsonRejection::MissingJsonContentType(_) => ErrorCode::UnsupportedMediaType,
            _ => ErrorCode::BadRequest,
        };
        Self::new(code, rejection.body_text())
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self::internal(&err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope {
            error: Detail {
                code: self.code,
                message: &self.message,
                details: self.details.as_ref(),
            },
        };
        (self.code.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.status_code(), self.message)
    }
}

impl std::error::Error for ApiError {}
