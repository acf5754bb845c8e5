use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures surfaced at the request boundary. Everything a handler can
/// return maps onto one of these; clients see a status code plus a
/// human-readable message, never a raw database error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Not found")]
    NotFound,
    #[error("Email already taken by another user.")]
    DuplicateEmail,
    #[error(transparent)]
    Persistence(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, field, message) = match &self {
            AppError::Validation { field, message } => {
                (StatusCode::BAD_REQUEST, Some(*field), message.clone())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                None,
                "Invalid credentials".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, None, "Not found".to_string()),
            AppError::DuplicateEmail => (
                StatusCode::CONFLICT,
                Some("email"),
                "Email already taken by another user.".to_string(),
            ),
            AppError::Persistence(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
        };

        let mut body = json!({ "error": message });
        if let Some(field) = field {
            body["field"] = json!(field);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let res = AppError::validation("title", "Task title is required.").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_and_duplicate_statuses() {
        assert_eq!(
            AppError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::DuplicateEmail.into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn persistence_hides_details() {
        let res = AppError::Persistence(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
