use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FlowConfig;
use crate::error::{SocialClientError, SocialClientResult};
use crate::models::{AuthResponse, Profile};
use crate::provider::AuthProvider;
use crate::sink::NotificationSink;
use crate::summary::PostsReport;

/// Сообщение сразу после успешного входа.
pub const WELCOME_MESSAGE: &str = "Welcome!  Fetching your information...";
/// Сообщение при отказе от входа.
pub const CANCELLED_MESSAGE: &str = "User canceled login or did not fully authorize.";

/// Приветствие по имени из профиля.
pub fn greeting(profile: &Profile) -> String {
    format!("Good to see you, {}.", profile.name)
}

/// Источник сырого ответа `/posts`.
#[async_trait]
pub trait PostsSource: Send + Sync {
    /// Загружает посты, используя токен как параметр запроса.
    async fn fetch_posts(&self, token: &str) -> SocialClientResult<Value>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Состояние потока входа.
pub enum FlowState {
    /// `run` ещё не вызывался.
    Uninitialized,
    /// SDK настроен.
    Initialized,
    /// Ожидаем решения пользователя.
    LoginPending,
    /// Пользователь отказался.
    Denied,
    /// Вход выполнен, загружаем профиль и посты.
    Authorized,
    /// Профиль и посты обработаны.
    Finished,
    /// Инициализация или вход завершились ошибкой.
    Failed,
}

#[derive(Debug)]
/// Итог успешного входа.
pub struct AuthorizedOutcome {
    /// Токен пользователя.
    pub auth: AuthResponse,
    /// Профиль или ошибка его загрузки.
    pub profile: SocialClientResult<Profile>,
    /// Сводка постов; `None`, если запрос постов отключён.
    pub posts: Option<SocialClientResult<PostsReport>>,
}

#[derive(Debug)]
/// Итог потока входа.
pub enum FlowOutcome {
    /// Пользователь отказался или не выдал разрешения.
    Denied,
    /// Вход выполнен.
    Authorized(AuthorizedOutcome),
}

/// Поток: инициализация SDK, вход, профиль и (опционально) посты.
///
/// Поток выполняется один раз; все сообщения уходят в один приёмник.
pub struct LoginFlow<P, S> {
    provider: P,
    sink: S,
    posts: Option<Arc<dyn PostsSource>>,
    config: FlowConfig,
    state: FlowState,
}

impl<P, S> LoginFlow<P, S>
where
    P: AuthProvider,
    S: NotificationSink,
{
    /// Создаёт поток без источника постов.
    pub fn new(provider: P, sink: S, config: FlowConfig) -> Self {
        Self {
            provider,
            sink,
            posts: None,
            config,
            state: FlowState::Uninitialized,
        }
    }

    /// Подключает источник постов. При `PostsVariant::Disabled` он не вызывается,
    /// при остальных вариантах без источника поток сообщает об ошибке постов.
    pub fn with_posts_source(mut self, source: Arc<dyn PostsSource>) -> Self {
        self.posts = Some(source);
        self
    }

    /// Текущее состояние.
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Выполняет поток целиком.
    ///
    /// Ошибки профиля и постов не прерывают поток: о них сообщается
    /// в приёмник, а сами ошибки возвращаются в [`AuthorizedOutcome`].
    pub async fn run(&mut self) -> SocialClientResult<FlowOutcome> {
        if self.state != FlowState::Uninitialized {
            return Err(SocialClientError::FlowAlreadyStarted);
        }

        match self.authorize().await {
            Ok(Some(auth)) => {
                self.transition(FlowState::Authorized);
                self.sink.notify(WELCOME_MESSAGE);

                let (profile, posts) =
                    tokio::join!(self.fetch_profile(&auth), self.fetch_posts(&auth));

                self.transition(FlowState::Finished);
                Ok(FlowOutcome::Authorized(AuthorizedOutcome {
                    auth,
                    profile,
                    posts,
                }))
            }
            Ok(None) => {
                self.transition(FlowState::Denied);
                self.sink.notify(CANCELLED_MESSAGE);
                Ok(FlowOutcome::Denied)
            }
            Err(err) => {
                warn!(error = %err, "login flow failed");
                self.transition(FlowState::Failed);
                Err(err)
            }
        }
    }

    async fn authorize(&mut self) -> SocialClientResult<Option<AuthResponse>> {
        self.provider.initialize(&self.config.options).await?;
        self.transition(FlowState::Initialized);

        self.transition(FlowState::LoginPending);
        self.provider.login(&self.config.scope).await
    }

    async fn fetch_profile(&self, auth: &AuthResponse) -> SocialClientResult<Profile> {
        match self.provider.profile(auth).await {
            Ok(profile) => {
                self.sink.notify(&greeting(&profile));
                Ok(profile)
            }
            Err(err) => {
                warn!(error = %err, "profile request failed");
                self.sink
                    .notify(&format!("Could not load your profile: {err}"));
                Err(err)
            }
        }
    }

    async fn fetch_posts(&self, auth: &AuthResponse) -> Option<SocialClientResult<PostsReport>> {
        let variant = self.config.posts_variant;
        if !variant.is_enabled() {
            debug!("posts request disabled");
            return None;
        }

        let report = match self.posts.as_ref() {
            Some(source) => match source.fetch_posts(&auth.access_token).await {
                Ok(body) => variant.summarize(body),
                Err(err) => Err(err),
            },
            None => Err(SocialClientError::InvalidRequest(
                "posts source is not configured".to_string(),
            )),
        };

        match report {
            Ok(Some(report)) => {
                self.sink.notify(&report.message());
                Some(Ok(report))
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, %variant, "posts request failed");
                self.sink.notify(&format!("Could not load posts: {err}"));
                Some(Err(err))
            }
        }
    }

    fn transition(&mut self, next: FlowState) {
        debug!(from = ?self.state, to = ?next, "login flow transition");
        self.state = next;
    }
}
