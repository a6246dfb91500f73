use axum::{Router, routing::post};

use crate::presentation::AppState;
use crate::presentation::handlers::checkin::hello_world;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/helloworld", post(hello_world))
}
