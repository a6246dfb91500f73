use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::domain::error::DomainError;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HomeDto {
    /// Пользователь уже разрешил приложению доступ.
    pub(crate) authorized: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct CallbackQuery {
    pub(crate) code: Option<String>,
    pub(crate) error: Option<String>,
    pub(crate) error_reason: Option<String>,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "auth",
    responses(
        (status = 200, description = "Authorization status", body = HomeDto)
    )
)]
pub(crate) async fn home(State(state): State<AppState>) -> Json<HomeDto> {
    Json(HomeDto {
        authorized: state.oauth.is_authorized().await,
    })
}

#[utoipa::path(
    get,
    path = "/authorize",
    tag = "auth",
    responses(
        (status = 303, description = "Redirect to the login dialog")
    )
)]
pub(crate) async fn authorize(State(state): State<AppState>) -> AppResult<Redirect> {
    let url = state.oauth.authorize_url()?;
    Ok(Redirect::to(url.as_str()))
}

#[utoipa::path(
    get,
    path = "/callback",
    tag = "auth",
    params(CallbackQuery),
    responses(
        (status = 303, description = "Token stored, redirect to home"),
        (status = 403, description = "Access was not granted or authorization failed"),
        (status = 502, description = "Graph API unreachable")
    )
)]
pub(crate) async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Redirect> {
    if let Some(error) = query.error {
        warn!(%error, reason = ?query.error_reason, "login dialog returned an error");
        return Err(DomainError::AuthorizationFailed(error).into());
    }

    state.oauth.handle_callback(query.code.as_deref()).await?;
    Ok(Redirect::to("/"))
}
