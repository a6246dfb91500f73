use axum::{Json, Router, routing::get};
use serde::Serialize;

use super::{AppState, routes};

pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .merge(routes::router())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthzResponse> {
    Json(HealthzResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use social_client::{GraphApi, SdkOptions};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::application::oauth_service::OAuthService;

    fn app(graph_url: &str) -> Router {
        let options = SdkOptions::new("app-1", "http://localhost:8080/callback")
            .with_secret("secret-1")
            .with_graph_url(graph_url);
        let graph = GraphApi::from_options(&options).expect("graph client");
        let oauth = OAuthService::new(graph, options, "publish_actions".parse().expect("scope"));
        routes(AppState::new(Arc::new(oauth)))
    }

    async fn send(app: &Router, method: &str, uri: &str) -> axum::response::Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        app.clone().oneshot(request).await.expect("response")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    async fn mount_token_exchange(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v2.4/oauth/access_token"))
            .and(query_param("code", "good-code"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "user-token"})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let app = app("http://127.0.0.1:9");
        let response = send(&app, "GET", "/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn authorize_redirects_to_dialog() {
        let app = app("http://127.0.0.1:9");
        let response = send(&app, "GET", "/authorize").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .expect("location header");
        assert!(location.starts_with("https://www.facebook.com/dialog/oauth?"));
        assert!(location.contains("client_id=app-1"));
        assert!(location.contains("scope=publish_actions"));
    }

    #[tokio::test]
    async fn callback_stores_token_and_home_reports_it() {
        let server = MockServer::start().await;
        mount_token_exchange(&server).await;
        let app = app(&server.uri());

        let before = send(&app, "GET", "/").await;
        assert_eq!(json_body(before).await, json!({"authorized": false}));

        let response = send(&app, "GET", "/callback?code=good-code").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).expect("location"),
            "/"
        );

        let after = send(&app, "GET", "/").await;
        assert_eq!(json_body(after).await, json!({"authorized": true}));
    }

    #[tokio::test]
    async fn denied_callback_is_forbidden() {
        let app = app("http://127.0.0.1:9");
        let response = send(
            &app,
            "GET",
            "/callback?error=access_denied&error_reason=user_denied",
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Access was not granted or authorization failed"})
        );
    }

    #[tokio::test]
    async fn hello_world_without_token_is_unauthorized() {
        let app = app("http://127.0.0.1:9");
        let response = send(&app, "POST", "/helloworld?lat=1.5&lng=2.5").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, json!({"error": "Not authorized"}));
    }

    #[tokio::test]
    async fn hello_world_returns_location_of_place() {
        let server = MockServer::start().await;
        mount_token_exchange(&server).await;
        Mock::given(method("GET"))
            .and(path("/v2.4/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "9", "name": "Cafe", "location": {"latitude": 1.5, "longitude": 2.5}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2.4/me/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1_2"})))
            .expect(1)
            .mount(&server)
            .await;
        let app = app(&server.uri());

        send(&app, "GET", "/callback?code=good-code").await;
        let response = send(&app, "POST", "/helloworld?lat=1.5&lng=2.5").await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            json_body(response).await,
            json!({"name": "Cafe", "lat": 1.5, "lng": 2.5})
        );
    }

    #[tokio::test]
    async fn hello_world_without_place_is_empty_created() {
        let server = MockServer::start().await;
        mount_token_exchange(&server).await;
        Mock::given(method("GET"))
            .and(path("/v2.4/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v2.4/me/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1_3"})))
            .mount(&server)
            .await;
        let app = app(&server.uri());

        send(&app, "GET", "/callback?code=good-code").await;
        let response = send(&app, "POST", "/helloworld?lat=0&lng=0").await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn hello_world_upstream_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        mount_token_exchange(&server).await;
        Mock::given(method("GET"))
            .and(path("/v2.4/search"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"message": "An unknown error has occurred."}
            })))
            .mount(&server)
            .await;
        let app = app(&server.uri());

        send(&app, "GET", "/callback?code=good-code").await;
        let response = send(&app, "POST", "/helloworld?lat=1&lng=2").await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Unknown error calling Graph API"})
        );
    }

    #[tokio::test]
    async fn hello_world_rejects_out_of_range_latitude() {
        let app = app("http://127.0.0.1:9");
        let response = send(&app, "POST", "/helloworld?lat=123&lng=2").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
