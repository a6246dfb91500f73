use anyhow::{Context, Result, anyhow};
use social_client::{
    DEFAULT_API_VERSION, DEFAULT_DIALOG_URL, DEFAULT_GRAPH_URL, Scope, SdkOptions,
};
use url::Url;

#[derive(Debug, Clone)]
pub struct Settings {
    pub app_id: String,
    pub app_secret: String,
    pub graph_url: String,
    pub api_version: String,
    pub dialog_url: String,
    pub oauth_scope: Scope,
    pub public_url: String,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let app_id = get_required("FACEBOOK_APP_ID").context("FACEBOOK_APP_ID is required")?;
        let app_secret =
            get_required("FACEBOOK_APP_SECRET").context("FACEBOOK_APP_SECRET is required")?;

        let graph_url =
            std::env::var("GRAPH_API_URL").unwrap_or_else(|_| DEFAULT_GRAPH_URL.to_string());
        let api_version =
            std::env::var("GRAPH_API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());
        let dialog_url =
            std::env::var("OAUTH_DIALOG_URL").unwrap_or_else(|_| DEFAULT_DIALOG_URL.to_string());
        let oauth_scope: Scope = std::env::var("OAUTH_SCOPE")
            .unwrap_or_else(|_| "publish_actions".to_string())
            .parse()
            .context("Failed to parse OAUTH_SCOPE")?;

        let public_url =
            std::env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        Url::parse(&public_url).context("PUBLIC_URL must be an absolute url")?;

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:8080,http://127.0.0.1:8080".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 64 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;

        Ok(Self {
            app_id,
            app_secret,
            graph_url,
            api_version,
            dialog_url,
            oauth_scope,
            public_url,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
        })
    }

    /// Адрес `/callback` этого сервера, куда диалог вернёт пользователя.
    pub fn redirect_uri(&self) -> String {
        callback_url(&self.public_url)
    }

    pub fn sdk_options(&self) -> SdkOptions {
        SdkOptions::new(&self.app_id, self.redirect_uri())
            .with_secret(&self.app_secret)
            .with_graph_url(&self.graph_url)
            .with_api_version(&self.api_version)
            .with_dialog_url(&self.dialog_url)
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn callback_url(public_url: &str) -> String {
    format!("{}/callback", public_url.trim_end_matches('/'))
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
