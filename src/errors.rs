use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Request-level failures, rendered as the standard response envelope.
/// Messages are client-facing and localized for the storefront; the
/// underlying causes go to the log instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    TooManyRequests(String),
    #[error("{0}")]
    Dependency(String),
}

impl ApiError {
    /// Logs the cause and keeps only the operation context for the client.
    pub fn dependency(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "{context}");
        ApiError::Dependency(context.to_string())
    }
}

/// Maps a repository error by route context: an empty result becomes the
/// given 404, anything else a dependency failure.
pub fn not_found_or_dependency(
    err: diesel::result::Error,
    not_found_message: &str,
    context: &str,
) -> ApiError {
    match err {
        diesel::result::Error::NotFound => ApiError::NotFound(not_found_message.to_string()),
        other => ApiError::dependency(context, other),
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => HttpResponse::build(self.status_code()).json(json!({
                "success": false,
                "errors": errors,
            })),
            other => HttpResponse::build(self.status_code()).json(json!({
                "success": false,
                "error": other.to_string(),
            })),
        }
    }
}
