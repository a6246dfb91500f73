use crate::domain::error::DomainError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::Domain(err) => match err {
                DomainError::AuthorizationFailed(_) => (
                    StatusCode::FORBIDDEN,
                    "Access was not granted or authorization failed".to_string(),
                ),
                DomainError::NotAuthorized => {
                    (StatusCode::UNAUTHORIZED, "Not authorized".to_string())
                }
                DomainError::Upstream(_) => (
                    StatusCode::BAD_GATEWAY,
                    "Unknown error calling Graph API".to_string(),
                ),
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        };

        (status, Json(ErrorBody { error: msg })).into_response()
    }
}
