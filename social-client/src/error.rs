use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `social-client`.
pub enum SocialClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Некорректный URL в настройках или ответе.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Тело ответа не является корректным JSON.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// Требуется авторизация (отсутствует/некорректен токен).
    #[error("unauthorized")]
    Unauthorized,

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound,

    /// Провайдер не выдал токен доступа.
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// `login` вызван до `initialize`.
    #[error("auth provider is not initialized")]
    NotInitialized,

    /// Поток входа уже запускался.
    #[error("login flow has already been started")]
    FlowAlreadyStarted,

    /// JSON корректен, но имеет неожиданную форму.
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),

    /// Некорректный запрос или ошибка валидации параметров.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Результат операций `social-client`.
pub type SocialClientResult<T> = Result<T, SocialClientError>;

impl SocialClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            _ => {
                let message = message.unwrap_or_else(|| format!("http status {status}"));
                Self::InvalidRequest(message)
            }
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        if err.is_decode() {
            return Self::UnexpectedPayload(err.to_string());
        }
        Self::Http(err)
    }
}
