use std::sync::Arc;

use crate::application::oauth_service::OAuthService;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) oauth: Arc<OAuthService>,
}

impl AppState {
    pub(crate) fn new(oauth: Arc<OAuthService>) -> Self {
        Self { oauth }
    }
}
