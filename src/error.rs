use std::collections::BTreeMap;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::{ApiResponse, SubmissionStatus};
use crate::moderation::ModerationError;

/// Failures raised by catalog stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// Conditional write refused because the record left `pending`.
    #[error("record is {0}, expected pending")]
    NotPending(SubmissionStatus),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Moderation(#[from] ModerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{what} not found"))
    }
}

/// Flattens validator output into `field -> [messages]`.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Moderation(ModerationError::MissingReason) => StatusCode::BAD_REQUEST,
            AppError::Moderation(_) | AppError::Store(StoreError::NotPending(_)) => {
                StatusCode::CONFLICT
            }
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(errors) => ApiResponse::<()>::validation(
                "Validation failed".into(),
                field_messages(errors),
            ),
            AppError::Store(StoreError::NotFound) => {
                ApiResponse::<()>::error("Record not found".into())
            }
            AppError::Store(StoreError::NotPending(status)) => ApiResponse::<()>::error(
                ModerationError::NotEditable(*status).to_string(),
            ),
            AppError::Store(err) => {
                log::error!("Store failure: {err:?}");
                ApiResponse::<()>::error("Internal server error".into())
            }
            other => ApiResponse::<()>::error(other.to_string()),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use validator::ValidationError;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(ModerationError::AlreadyDecided(SubmissionStatus::Approved))
                .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(ModerationError::MissingReason).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(StoreError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn field_messages_prefer_custom_text() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "name",
            ValidationError::new("length").with_message(Cow::Borrowed("demasiado corto")),
        );
        errors.add("zone", ValidationError::new("length"));

        let fields = field_messages(&errors);
        assert_eq!(fields["name"], vec!["demasiado corto".to_string()]);
        assert_eq!(fields["zone"], vec!["length".to_string()]);
    }
}
