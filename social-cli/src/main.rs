use std::fs;
use std::io;
use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use social_client::{
    CheckIn, ConsentPrompt, ConsoleSink, FlowConfig, FlowOutcome, GraphApi, GraphAuthProvider,
    HtmlSink, LoginFlow, NotificationSink, PostsApi, PostsVariant, Scope, SdkOptions,
    SocialClientError, SocialClientResult, StdoutSink, authorization_code_from_redirect,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

const TOKEN_FILE: &str = ".social_token";
const DEFAULT_POSTS_SERVER: &str = "http://127.0.0.1:8080";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/callback";

#[derive(Debug, Parser)]
#[command(name = "social-cli", version, about = "CLI входа через Graph API")]
struct Cli {
    /// Идентификатор приложения.
    #[arg(long, global = true, env = "FACEBOOK_APP_ID")]
    app_id: Option<String>,

    /// Секрет приложения (нужен для обмена кода на токен).
    #[arg(long, global = true, env = "FACEBOOK_APP_SECRET", hide_env_values = true)]
    app_secret: Option<String>,

    /// Базовый адрес Graph API.
    #[arg(long, global = true, env = "GRAPH_API_URL", default_value = social_client::DEFAULT_GRAPH_URL)]
    graph_url: String,

    /// Версия Graph API.
    #[arg(long, global = true, env = "GRAPH_API_VERSION", default_value = social_client::DEFAULT_API_VERSION)]
    api_version: String,

    /// Адрес редиректа, зарегистрированный в настройках приложения.
    #[arg(long, global = true, env = "OAUTH_REDIRECT_URI", default_value = DEFAULT_REDIRECT_URI)]
    redirect_uri: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    /// Печать в stdout.
    Stdout,
    /// Лог разработчика (`tracing`).
    Console,
    /// HTML-блок, печатается в конце.
    Html,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Вход: профиль и (опционально) сводка постов.
    Login {
        /// Разрешения через запятую.
        #[arg(long, default_value = "public_profile")]
        scope: Scope,
        /// Формат ответа `/posts`: counts, list или disabled.
        #[arg(long, default_value = "counts")]
        posts: PostsVariant,
        /// Адрес сервера с эндпоинтом `/posts`.
        #[arg(long)]
        server: Option<String>,
        /// Куда выводить сообщения.
        #[arg(long, value_enum, default_value_t = SinkKind::Stdout)]
        sink: SinkKind,
        /// Открыть диалог авторизации в браузере.
        #[arg(long)]
        open: bool,
    },
    /// Сводка постов по сохранённому токену.
    Posts {
        #[arg(long)]
        token: Option<String>,
        #[arg(long, default_value = "counts")]
        posts: PostsVariant,
        #[arg(long)]
        server: Option<String>,
    },
    /// Отметка «Hello World» в ближайшей кофейне (требует токен).
    Checkin {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long)]
        token: Option<String>,
    },
    /// Проверка настроек приложения: получение токена приложения.
    AppToken,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Command::Login {
            sink: SinkKind::Console,
            ..
        } => "info",
        _ => "warn",
    };
    if let Err(err) = init_logging(default_level) {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }

    if let Err(err) = run(cli).await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let options = sdk_options(&cli);

    match cli.command {
        Command::Login {
            scope,
            posts,
            server,
            sink,
            open,
        } => {
            require_app_id(&options)?;
            let config = FlowConfig {
                options,
                scope,
                posts_variant: posts,
            };
            login(config, server, sink, open).await?;
        }
        Command::Posts {
            token,
            posts,
            server,
        } => {
            let token = resolve_token(token)?;
            let api = PostsApi::new(normalize_server(server)).map_err(map_client_error)?;
            let body = api.get_posts(&token).await.map_err(map_client_error)?;
            match posts.summarize(body).map_err(map_client_error)? {
                Some(report) => println!("{}", report.message()),
                None => println!("Запрос постов отключён"),
            }
        }
        Command::Checkin { lat, lng, token } => {
            let token = resolve_token(token)?;
            let api = GraphApi::from_options(&options).map_err(map_client_error)?;
            let check_in = api
                .check_in(&token, lat, lng)
                .await
                .map_err(map_client_error)?;
            print_check_in(&check_in);
        }
        Command::AppToken => {
            require_app_id(&options)?;
            let secret = options
                .app_secret
                .as_deref()
                .context("нужен --app-secret или FACEBOOK_APP_SECRET")?;
            let api = GraphApi::from_options(&options).map_err(map_client_error)?;
            let token = api
                .app_token(&options.app_id, secret)
                .await
                .map_err(map_client_error)?;
            println!("Токен приложения получен");
            println!("token: {token}");
        }
    }

    Ok(())
}

async fn login(config: FlowConfig, server: Option<String>, sink: SinkKind, open: bool) -> Result<()> {
    let html = Arc::new(HtmlSink::new());
    let notifications: Arc<dyn NotificationSink> = match sink {
        SinkKind::Stdout => Arc::new(StdoutSink),
        SinkKind::Console => Arc::new(ConsoleSink),
        SinkKind::Html => html.clone(),
    };

    let provider = GraphAuthProvider::new(TerminalPrompt { open_browser: open });
    let posts = PostsApi::new(normalize_server(server)).map_err(map_client_error)?;
    let mut flow =
        LoginFlow::new(provider, notifications, config).with_posts_source(Arc::new(posts));

    let outcome = flow.run().await.map_err(map_client_error)?;

    if sink == SinkKind::Html {
        println!("{}", html.content());
    }

    if let FlowOutcome::Authorized(outcome) = outcome {
        persist_token(&outcome.auth.access_token).context("не удалось сохранить токен")?;
    }
    Ok(())
}

/// Запрос согласия через терминал: ссылка в stderr, ответ из stdin.
struct TerminalPrompt {
    open_browser: bool,
}

#[async_trait]
impl ConsentPrompt for TerminalPrompt {
    async fn request_consent(&self, authorize_url: &Url) -> SocialClientResult<Option<String>> {
        eprintln!("Откройте ссылку и разрешите доступ приложению:");
        eprintln!("{authorize_url}");
        if self.open_browser {
            if let Err(err) = open::that(authorize_url.as_str()) {
                warn!(error = %err, "failed to open browser");
            }
        }
        eprintln!("Вставьте адрес, на который вас перенаправило, или код (пустая строка означает отказ):");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let line = lines.next_line().await.map_err(|err| {
            SocialClientError::InvalidRequest(format!("failed to read consent answer: {err}"))
        })?;
        Ok(line.as_deref().and_then(authorization_code_from_redirect))
    }
}

fn sdk_options(cli: &Cli) -> SdkOptions {
    let mut options = SdkOptions::new(cli.app_id.clone().unwrap_or_default(), &cli.redirect_uri)
        .with_graph_url(&cli.graph_url)
        .with_api_version(&cli.api_version);
    if let Some(secret) = &cli.app_secret {
        options = options.with_secret(secret);
    }
    options
}

fn require_app_id(options: &SdkOptions) -> Result<()> {
    if options.app_id.trim().is_empty() {
        return Err(anyhow!("нужен --app-id или FACEBOOK_APP_ID"));
    }
    Ok(())
}

fn normalize_server(server: Option<String>) -> String {
    let server = server.unwrap_or_else(|| DEFAULT_POSTS_SERVER.to_string());
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn resolve_token(explicit: Option<String>) -> Result<String> {
    if let Some(token) = explicit.as_deref().and_then(parse_token_content) {
        return Ok(token);
    }
    load_token()
        .context("не удалось прочитать .social_token")?
        .ok_or_else(|| map_client_error(SocialClientError::Unauthorized))
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(token: &str) -> io::Result<()> {
    fs::write(TOKEN_FILE, token)
}

fn map_client_error(err: SocialClientError) -> anyhow::Error {
    let message = match err {
        SocialClientError::Unauthorized => {
            "требуется авторизация: выполните `social-cli login ...` или передайте --token"
                .to_string()
        }
        SocialClientError::NotFound => "ресурс не найден".to_string(),
        SocialClientError::AuthorizationFailed(message) => {
            format!("авторизация не удалась: {message}")
        }
        SocialClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        SocialClientError::UnexpectedPayload(message) => {
            format!("неожиданный ответ сервера: {message}")
        }
        SocialClientError::Http(err) => format!("ошибка HTTP: {err}"),
        SocialClientError::Url(err) => format!("некорректный адрес: {err}"),
        SocialClientError::Json(err) => format!("некорректный JSON: {err}"),
        SocialClientError::NotInitialized | SocialClientError::FlowAlreadyStarted => {
            format!("внутренняя ошибка: {err}")
        }
    };
    anyhow!(message)
}

fn print_check_in(check_in: &CheckIn) {
    println!("Запись опубликована");
    if let Some(id) = &check_in.post_id {
        println!("post_id: {id}");
    }
    match &check_in.place {
        Some(place) => println!(
            "{}",
            serde_json::json!({"name": place.name, "lat": place.lat, "lng": place.lng})
        ),
        None => println!("Место не найдено, остаёмся дома"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server(Some("https://example.com:8080".to_string()));
        assert_eq!(s, "https://example.com:8080");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server(Some("127.0.0.1:9000".to_string()));
        assert_eq!(s, "http://127.0.0.1:9000");
    }

    #[test]
    fn normalize_server_defaults_to_local() {
        assert_eq!(normalize_server(None), DEFAULT_POSTS_SERVER);
    }

    #[test]
    fn parse_token_content_trims_whitespace() {
        let token = parse_token_content("  EAAB.token  ");
        assert_eq!(token.as_deref(), Some("EAAB.token"));
    }

    #[test]
    fn parse_token_content_rejects_blank() {
        let token = parse_token_content("   ");
        assert!(token.is_none());
    }

    #[test]
    fn login_args_parse_scope_and_variant() {
        let cli = Cli::try_parse_from([
            "social-cli",
            "--app-id",
            "123",
            "login",
            "--scope",
            "email,user_posts",
            "--posts",
            "list",
            "--sink",
            "html",
        ])
        .expect("args must parse");

        match cli.command {
            Command::Login {
                scope, posts, sink, ..
            } => {
                assert_eq!(scope.as_param(), "email,user_posts");
                assert_eq!(posts, PostsVariant::List);
                assert_eq!(sink, SinkKind::Html);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_posts_variant_is_rejected() {
        let result = Cli::try_parse_from(["social-cli", "login", "--posts", "everything"]);
        assert!(result.is_err());
    }

    #[test]
    fn sdk_options_take_global_flags() {
        let cli = Cli::try_parse_from([
            "social-cli",
            "--app-id",
            "123",
            "--app-secret",
            "s",
            "--api-version",
            "v3.0",
            "app-token",
        ])
        .expect("args must parse");
        let options = sdk_options(&cli);
        assert_eq!(options.app_id, "123");
        assert_eq!(options.app_secret.as_deref(), Some("s"));
        assert_eq!(options.api_version, "v3.0");
    }

    #[test]
    fn missing_app_id_is_reported() {
        let options = SdkOptions::new("", DEFAULT_REDIRECT_URI);
        assert!(require_app_id(&options).is_err());
    }
}
