use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use formrelay_shared::FieldError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: &'static str,
        errors: Vec<FieldError>,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("Origin not allowed")]
    OriginRejected,

    #[error("Too many requests from this IP, please try again later.")]
    RateLimited { retry_after: String },

    #[error("Route not found: {method} {path}")]
    NotFound { path: String, method: String },

    #[error("{0}")]
    Delivery(String),

    #[error("Internal server error: {message}")]
    Internal { message: String, expose: bool },
}

impl AppError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        AppError::Validation {
            message: "Validation failed",
            errors,
        }
    }

    /// `expose` controls whether `message` reaches the client.
    pub fn internal(message: impl Into<String>, expose: bool) -> Self {
        AppError::Internal {
            message: message.into(),
            expose,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation { message, errors } => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": message, "errors": errors }),
            ),
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": message }),
            ),
            AppError::OriginRejected => (
                StatusCode::FORBIDDEN,
                json!({ "error": "CORS policy error", "message": "Origin not allowed" }),
            ),
            AppError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "Too many requests from this IP, please try again later.",
                    "retryAfter": retry_after,
                }),
            ),
            AppError::NotFound { path, method } => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Route not found", "path": path, "method": method }),
            ),
            AppError::Delivery(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "message": message }),
            ),
            AppError::Internal { message, expose } => {
                tracing::error!("Internal error: {}", message);
                let message = if expose {
                    message
                } else {
                    "Something went wrong".to_string()
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error", "message": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
