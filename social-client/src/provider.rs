use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::config::{Scope, SdkOptions};
use crate::error::{SocialClientError, SocialClientResult};
use crate::http_client::GraphApi;
use crate::models::{AuthResponse, Profile};

/// Граница между потоком входа и SDK социальной сети.
///
/// Реальная реализация: [`GraphAuthProvider`]. В тестах её заменяют двойником.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Настраивает SDK. Должен завершиться до `login`.
    async fn initialize(&mut self, options: &SdkOptions) -> SocialClientResult<()>;

    /// Запрашивает у пользователя разрешения `scope`.
    ///
    /// `Ok(None)` означает отказ или отмену входа.
    async fn login(&self, scope: &Scope) -> SocialClientResult<Option<AuthResponse>>;

    /// Загружает профиль владельца токена.
    async fn profile(&self, auth: &AuthResponse) -> SocialClientResult<Profile>;
}

/// Шаг входа, требующий участия человека: показать диалог и дождаться ответа.
#[async_trait]
pub trait ConsentPrompt: Send + Sync {
    /// Возвращает код авторизации или `None`, если пользователь отказался.
    async fn request_consent(&self, authorize_url: &Url) -> SocialClientResult<Option<String>>;
}

/// Собирает URL диалога авторизации.
pub fn authorize_url(options: &SdkOptions, scope: &Scope) -> SocialClientResult<Url> {
    let mut url = Url::parse(&options.dialog_url)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("client_id", &options.app_id);
        query.append_pair("redirect_uri", &options.redirect_uri);
        if !scope.is_empty() {
            query.append_pair("scope", &scope.as_param());
        }
        query.append_pair("response_type", "code");
    }
    Ok(url)
}

/// Извлекает код авторизации из того, что вставил пользователь.
///
/// Принимает полный URL редиректа или сам код. Пустой ввод и редирект
/// с `error` означают отказ.
pub fn authorization_code_from_redirect(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let Ok(url) = Url::parse(input) else {
        return Some(input.to_string());
    };

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match &*key {
            "error" => return None,
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            _ => {}
        }
    }
    code
}

/// Вход через диалог авторизации Graph API с обменом кода на токен.
pub struct GraphAuthProvider<C> {
    prompt: C,
    session: Option<GraphSession>,
}

struct GraphSession {
    api: GraphApi,
    options: SdkOptions,
}

impl<C: ConsentPrompt> GraphAuthProvider<C> {
    /// Создаёт неинициализированный провайдер.
    pub fn new(prompt: C) -> Self {
        Self {
            prompt,
            session: None,
        }
    }

    /// `true` после успешного `initialize`.
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> SocialClientResult<&GraphSession> {
        self.session.as_ref().ok_or(SocialClientError::NotInitialized)
    }
}

#[async_trait]
impl<C: ConsentPrompt> AuthProvider for GraphAuthProvider<C> {
    async fn initialize(&mut self, options: &SdkOptions) -> SocialClientResult<()> {
        options.validate()?;
        let api = GraphApi::from_options(options)?;
        self.session = Some(GraphSession {
            api,
            options: options.clone(),
        });
        debug!(app_id = %options.app_id, version = %options.api_version, "sdk initialized");
        Ok(())
    }

    async fn login(&self, scope: &Scope) -> SocialClientResult<Option<AuthResponse>> {
        let session = self.session()?;
        let url = authorize_url(&session.options, scope)?;

        let Some(code) = self.prompt.request_consent(&url).await? else {
            info!("user declined authorization");
            return Ok(None);
        };

        let secret = session.options.app_secret.as_deref().ok_or_else(|| {
            SocialClientError::InvalidRequest(
                "app secret is required to exchange the authorization code".to_string(),
            )
        })?;
        let auth = session
            .api
            .user_token(
                &session.options.app_id,
                secret,
                &session.options.redirect_uri,
                &code,
            )
            .await?;
        info!("user authorized");
        Ok(Some(auth))
    }

    async fn profile(&self, auth: &AuthResponse) -> SocialClientResult<Profile> {
        self.session()?.api.me(&auth.access_token).await
    }
}
