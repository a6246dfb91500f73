use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::infrastructure::settings::Settings;
use crate::presentation::middleware::{cors, limits, trace};
use crate::presentation::openapi::ApiDoc;
use crate::presentation::{AppState, http_handlers};

const SWAGGER_PATH: &str = "/swagger-ui";
const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Поднимает OAuth-сервер и обслуживает его до Ctrl+C.
pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = limits::apply_limits(build_router(state), settings);
    let app = cors::apply_cors(trace::apply_trace(app), settings)?;

    let listener = TcpListener::bind(&settings.http_addr).await?;
    info!(
        addr = %settings.http_addr,
        login = %format!("{}/authorize", settings.public_url.trim_end_matches('/')),
        docs = SWAGGER_PATH,
        "OAuth server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("OAuth server stopped");
    Ok(())
}

pub(crate) fn build_router(state: AppState) -> Router {
    http_handlers::routes(state)
        .merge(SwaggerUi::new(SWAGGER_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
