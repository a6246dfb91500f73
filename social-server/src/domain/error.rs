use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("user has not authorized the app")]
    NotAuthorized,

    #[error("graph api error: {0}")]
    Upstream(String),
}
