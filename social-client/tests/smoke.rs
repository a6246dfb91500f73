use social_client::GraphApi;

#[tokio::test]
#[ignore = "requires real FACEBOOK_APP_ID and FACEBOOK_APP_SECRET"]
async fn graph_app_token_smoke() {
    let app_id = std::env::var("FACEBOOK_APP_ID").expect("FACEBOOK_APP_ID must be set");
    let app_secret =
        std::env::var("FACEBOOK_APP_SECRET").expect("FACEBOOK_APP_SECRET must be set");
    let graph_url = std::env::var("GRAPH_API_URL")
        .unwrap_or_else(|_| social_client::DEFAULT_GRAPH_URL.to_string());

    let api = GraphApi::new(&graph_url, social_client::DEFAULT_API_VERSION)
        .expect("graph client must build");
    let token = api
        .app_token(&app_id, &app_secret)
        .await
        .expect("app token must be issued");
    assert!(!token.is_empty());
}
