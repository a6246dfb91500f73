use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{SocialClientError, SocialClientResult};
use crate::summary::PostsVariant;

/// Базовый адрес Graph API.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";
/// Версия Graph API по умолчанию.
pub const DEFAULT_API_VERSION: &str = "v2.4";
/// Адрес диалога авторизации.
pub const DEFAULT_DIALOG_URL: &str = "https://www.facebook.com/dialog/oauth";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Параметры подключения к SDK: идентификатор приложения, версия API, адреса.
pub struct SdkOptions {
    /// Идентификатор приложения.
    pub app_id: String,
    /// Секрет приложения, нужен для обмена кода на токен.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
    /// Версия Graph API, например `v2.4`.
    pub api_version: String,
    /// Базовый адрес Graph API.
    pub graph_url: String,
    /// Адрес диалога авторизации.
    pub dialog_url: String,
    /// Адрес, на который диалог вернёт пользователя с кодом.
    pub redirect_uri: String,
}

impl SdkOptions {
    /// Создаёт настройки с адресами по умолчанию.
    pub fn new(app_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            dialog_url: DEFAULT_DIALOG_URL.to_string(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Задаёт секрет приложения.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.app_secret = Some(secret.into());
        self
    }

    /// Задаёт базовый адрес Graph API.
    pub fn with_graph_url(mut self, graph_url: impl Into<String>) -> Self {
        self.graph_url = graph_url.into();
        self
    }

    /// Задаёт версию Graph API.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Задаёт адрес диалога авторизации.
    pub fn with_dialog_url(mut self, dialog_url: impl Into<String>) -> Self {
        self.dialog_url = dialog_url.into();
        self
    }

    /// Проверяет обязательные поля.
    pub fn validate(&self) -> SocialClientResult<()> {
        if self.app_id.trim().is_empty() {
            return Err(SocialClientError::InvalidRequest(
                "app id must not be empty".to_string(),
            ));
        }
        Url::parse(&self.graph_url)?;
        Url::parse(&self.dialog_url)?;
        Url::parse(&self.redirect_uri)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Набор запрашиваемых разрешений.
pub struct Scope(Vec<String>);

impl Scope {
    /// Создаёт scope из списка разрешений, отбрасывая пустые.
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            permissions
                .into_iter()
                .map(Into::into)
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    /// Список разрешений.
    pub fn permissions(&self) -> &[String] {
        &self.0
    }

    /// `true`, если разрешения не заданы.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Значение параметра `scope` для диалога авторизации.
    pub fn as_param(&self) -> String {
        self.0.join(",")
    }
}

impl FromStr for Scope {
    type Err = SocialClientError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(raw.split(',')))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_param())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Полная конфигурация потока входа.
pub struct FlowConfig {
    /// Параметры SDK.
    pub options: SdkOptions,
    /// Запрашиваемые разрешения.
    pub scope: Scope,
    /// Формат ответа `/posts`; `Disabled` отключает запрос.
    pub posts_variant: PostsVariant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parses_comma_separated_list() {
        let scope: Scope = " email, public_profile ,,user_posts".parse().expect("scope");
        assert_eq!(
            scope.permissions(),
            &["email", "public_profile", "user_posts"]
        );
        assert_eq!(scope.as_param(), "email,public_profile,user_posts");
    }

    #[test]
    fn blank_scope_is_empty() {
        let scope: Scope = "  ".parse().expect("scope");
        assert!(scope.is_empty());
    }

    #[test]
    fn options_require_app_id() {
        let options = SdkOptions::new("  ", "http://localhost:8080/callback");
        assert!(matches!(
            options.validate(),
            Err(SocialClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn options_reject_bad_redirect() {
        let options = SdkOptions::new("123", "not a url");
        assert!(matches!(options.validate(), Err(SocialClientError::Url(_))));
    }

    #[test]
    fn options_default_to_v2_4() {
        let options = SdkOptions::new("123", "http://localhost:8080/callback");
        assert_eq!(options.api_version, "v2.4");
        assert!(options.validate().is_ok());
    }
}
