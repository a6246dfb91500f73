use std::sync::Arc;

use anyhow::{Context, Result};
use social_client::GraphApi;
use tracing::info;

mod application;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::oauth_service::OAuthService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let options = settings.sdk_options();
    let graph = GraphApi::from_options(&options).context("failed to build Graph API client")?;
    let oauth = OAuthService::new(graph, options, settings.oauth_scope.clone());

    // Токен приложения запрашивается один раз: это проверка FACEBOOK_APP_ID/SECRET.
    oauth
        .register_app_token()
        .await
        .context("failed to obtain app token, check FACEBOOK_APP_ID and FACEBOOK_APP_SECRET")?;
    info!(redirect_uri = %settings.redirect_uri(), "app configuration validated");

    let state = AppState::new(Arc::new(oauth));
    server::run_http(&settings, state).await
}
