use axum::Router;

use super::AppState;

pub(crate) mod auth;
pub(crate) mod checkin;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(checkin::router())
}
