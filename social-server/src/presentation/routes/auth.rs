use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::handlers::auth::{authorize, callback, home};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/authorize", get(authorize))
        .route("/callback", get(callback))
}
