use anyhow::{Result, anyhow};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::infrastructure::settings::Settings;

fn allowed_origins(origins: &[String]) -> Result<AllowOrigin> {
    if origins.iter().any(|origin| origin == "*") {
        return Ok(AllowOrigin::any());
    }

    let parsed = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|err| anyhow!("invalid CORS origin {origin}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AllowOrigin::list(parsed))
}

// Страница вызывает только `/helloworld` и читает `/`, заголовок Authorization не нужен.
pub(crate) fn apply_cors(router: Router, settings: &Settings) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&settings.cors_origins)?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);
    Ok(router.layer(cors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_and_list_are_accepted() {
        assert!(allowed_origins(&["*".to_string()]).is_ok());
        assert!(allowed_origins(&["http://localhost:8080".to_string()]).is_ok());
    }

    #[test]
    fn origin_with_newline_is_rejected() {
        let err = allowed_origins(&["http://bad\n.test".to_string()]).expect_err("must fail");
        assert!(err.to_string().contains("invalid CORS origin"));
    }
}
