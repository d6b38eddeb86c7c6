use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ResponseStatus;

/// Error half of the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: Option<serde_json::Value>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            error,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("{0}")]
    NotFound(String),

    /// A referenced entity is absent. Reported as 400 rather than 404 because
    /// the request itself names the missing row.
    #[error("{0}")]
    MissingReference(String),

    #[error("{message}")]
    ValidationError {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError {
            message: "Invalid input data".to_string(),
            details: serde_json::to_value(&err).ok(),
        }
    }
}

impl ServiceError {
    /// Validation failure with a plain message and no field breakdown.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::ValidationError {
            message: message.into(),
            details: None,
        }
    }

    /// Validation failure for a single named field.
    pub fn invalid_field(message: impl Into<String>, field: &str, reason: &str) -> Self {
        ServiceError::ValidationError {
            message: message.into(),
            details: Some(json!({ field: reason })),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::HashError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingReference(_) | Self::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return a generic message so driver text never leaks.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) | Self::HashError(_) | Self::InternalError(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::ValidationError { details, .. } => details.clone(),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse::new(self.response_message(), self.details());
        (status, Json(body)).into_response()
    }
}

/// API Error type for HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("{message}")]
    ValidationError {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("{0}")]
    BadRequest(String),
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ServiceError(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationError {
            message: "Invalid input data".to_string(),
            details: Some(json!({ "body": rejection.body_text() })),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ServiceError(service_error) => service_error.into_response(),
            ApiError::ValidationError { message, details } => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(message, details)),
            )
                .into_response(),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(message, None)),
            )
                .into_response(),
        }
    }
}
