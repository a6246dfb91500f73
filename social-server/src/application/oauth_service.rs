use social_client::{
    CheckIn, GraphApi, Scope, SdkOptions, SocialClientError, authorize_url,
};
use tokio::sync::RwLock;
use tracing::{error, info};
use url::Url;

use crate::domain::error::DomainError;

#[derive(Debug, Default)]
struct Tokens {
    app: Option<String>,
    user: Option<String>,
}

/// Серверный OAuth-поток: диалог, обмен кода, хранение токенов и публикация.
pub(crate) struct OAuthService {
    graph: GraphApi,
    options: SdkOptions,
    scope: Scope,
    tokens: RwLock<Tokens>,
}

impl OAuthService {
    pub(crate) fn new(graph: GraphApi, options: SdkOptions, scope: Scope) -> Self {
        Self {
            graph,
            options,
            scope,
            tokens: RwLock::new(Tokens::default()),
        }
    }

    /// Получает токен приложения; используется при старте как проверка настроек.
    pub(crate) async fn register_app_token(&self) -> Result<(), DomainError> {
        let token = self
            .graph
            .app_token(&self.options.app_id, self.secret()?)
            .await
            .map_err(|err| {
                error!(error = %err, "app token request failed");
                DomainError::AuthorizationFailed("app access token not found".to_string())
            })?;
        self.tokens.write().await.app = Some(token);
        info!("app token registered");
        Ok(())
    }

    pub(crate) fn authorize_url(&self) -> Result<Url, DomainError> {
        authorize_url(&self.options, &self.scope)
            .map_err(|err| DomainError::AuthorizationFailed(err.to_string()))
    }

    /// Обменивает код из `/callback` на токен пользователя и сохраняет его.
    pub(crate) async fn handle_callback(&self, code: Option<&str>) -> Result<(), DomainError> {
        let code = code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or_else(|| DomainError::AuthorizationFailed("code is missing".to_string()))?;

        let auth = self
            .graph
            .user_token(
                &self.options.app_id,
                self.secret()?,
                &self.options.redirect_uri,
                code,
            )
            .await
            .map_err(|err| {
                error!(error = %err, "user token exchange failed");
                match err {
                    SocialClientError::Http(err) => DomainError::Upstream(err.to_string()),
                    other => DomainError::AuthorizationFailed(other.to_string()),
                }
            })?;

        self.tokens.write().await.user = Some(auth.access_token);
        info!("user token stored");
        Ok(())
    }

    pub(crate) async fn is_authorized(&self) -> bool {
        self.tokens.read().await.user.is_some()
    }

    /// Ищет кофейню рядом с точкой и публикует «Hello World» от имени пользователя.
    pub(crate) async fn hello_world(&self, lat: f64, lng: f64) -> Result<CheckIn, DomainError> {
        let token = self
            .tokens
            .read()
            .await
            .user
            .clone()
            .ok_or(DomainError::NotAuthorized)?;

        self.graph
            .check_in(&token, lat, lng)
            .await
            .map_err(|err| {
                error!(error = %err, "graph api call failed");
                match err {
                    SocialClientError::Unauthorized => DomainError::NotAuthorized,
                    other => DomainError::Upstream(other.to_string()),
                }
            })
    }

    fn secret(&self) -> Result<&str, DomainError> {
        self.options
            .app_secret
            .as_deref()
            .ok_or_else(|| DomainError::AuthorizationFailed("app secret is not set".to_string()))
    }
}
