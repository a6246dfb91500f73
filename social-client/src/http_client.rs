use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::SdkOptions;
use crate::error::{SocialClientError, SocialClientResult};
use crate::flow::PostsSource;
use crate::models::{AuthResponse, CheckIn, FeedPost, Place, PlaceLocation, Profile};

const PLACE_QUERY: &str = "coffee shop";
const SEARCH_DISTANCE_METRES: u32 = 10_000;
const HELLO_MESSAGE: &str = "Heading out for coffee. Hello World!";
const GOODBYE_MESSAGE: &str = "Staying home for coffee. Goodbye World!";

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<ErrorDetailsDto>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetailsDto {
    Graph { message: Option<String> },
    Plain(String),
}

#[derive(Debug, Deserialize)]
struct TokenDto {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
}

// Записи разбираются по одной: одна битая запись не должна ломать весь поиск.
#[derive(Debug, Deserialize)]
struct PlacesDto {
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct PublishedDto {
    id: Option<String>,
}

/// Разбирает тело ответа `oauth/access_token`.
///
/// Graph API старых версий отдаёт `access_token=...&expires=...`, новые отдают JSON.
pub(crate) fn parse_token_body(body: &str) -> Option<AuthResponse> {
    if let Ok(dto) = serde_json::from_str::<TokenDto>(body) {
        return dto.access_token.map(|access_token| AuthResponse {
            access_token,
            token_type: dto.token_type,
            expires_in: dto.expires_in,
        });
    }

    let mut access_token = None;
    let mut expires_in = None;
    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        match &*key {
            "access_token" if !value.is_empty() => access_token = Some(value.into_owned()),
            "expires" | "expires_in" => expires_in = value.parse().ok(),
            _ => {}
        }
    }
    access_token.map(|access_token| AuthResponse {
        access_token,
        token_type: None,
        expires_in,
    })
}

#[derive(Debug, Clone)]
/// Базовый HTTP-клиент с общим разбором ошибок.
struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    fn new(base_url: impl Into<String>) -> SocialClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: Response) -> SocialClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(ErrorResponseDto {
                error: Some(ErrorDetailsDto::Graph { message: Some(message) }),
            })
            | Ok(ErrorResponseDto {
                error: Some(ErrorDetailsDto::Plain(message)),
            }) => message,
            _ => format!("http status {status}"),
        };
        SocialClientError::from_http_status(status, Some(message))
    }

    async fn read_json<T>(response: Response) -> SocialClientResult<T>
    where
        T: DeserializeOwned,
    {
        let body = response
            .bytes()
            .await
            .map_err(SocialClientError::from_reqwest)?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn execute(&self, request: RequestBuilder) -> SocialClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(SocialClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    /// универсальный helper для GET-запросов с json-ответом
    async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: Option<&str>,
    ) -> SocialClientResult<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self.client.get(self.endpoint(path)).query(query);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        Self::read_json(self.execute(request).await?).await
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> SocialClientResult<String> {
        let request = self.client.get(self.endpoint(path)).query(query);
        self.execute(request)
            .await?
            .text()
            .await
            .map_err(SocialClientError::from_reqwest)
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент Graph API конкретной версии.
pub struct GraphApi {
    http: HttpClient,
}

impl GraphApi {
    /// Создаёт клиент для `graph_url/api_version`.
    pub fn new(graph_url: &str, api_version: &str) -> SocialClientResult<Self> {
        let base = graph_url.trim_end_matches('/');
        let version = api_version.trim_matches('/');
        let base_url = if version.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{version}")
        };
        Ok(Self {
            http: HttpClient::new(base_url)?,
        })
    }

    /// Создаёт клиент по настройкам SDK.
    pub fn from_options(options: &SdkOptions) -> SocialClientResult<Self> {
        Self::new(&options.graph_url, &options.api_version)
    }

    /// Получает токен приложения (client credentials).
    pub async fn app_token(&self, app_id: &str, app_secret: &str) -> SocialClientResult<String> {
        let body = self
            .http
            .get_text(
                "oauth/access_token",
                &[
                    ("client_id", app_id),
                    ("client_secret", app_secret),
                    ("grant_type", "client_credentials"),
                ],
            )
            .await?;

        parse_token_body(&body)
            .map(|auth| auth.access_token)
            .ok_or_else(|| {
                SocialClientError::AuthorizationFailed("app access token not found".to_string())
            })
    }

    /// Обменивает код авторизации на токен пользователя.
    pub async fn user_token(
        &self,
        app_id: &str,
        app_secret: &str,
        redirect_uri: &str,
        code: &str,
    ) -> SocialClientResult<AuthResponse> {
        let body = self
            .http
            .get_text(
                "oauth/access_token",
                &[
                    ("client_id", app_id),
                    ("redirect_uri", redirect_uri),
                    ("client_secret", app_secret),
                    ("code", code),
                ],
            )
            .await?;

        parse_token_body(&body).ok_or_else(|| {
            SocialClientError::AuthorizationFailed("user access token not found".to_string())
        })
    }

    /// Возвращает профиль владельца токена.
    pub async fn me(&self, token: &str) -> SocialClientResult<Profile> {
        debug!("requesting /me");
        self.http
            .get_json("me", &[("fields", "id,name")], Some(token))
            .await
    }

    /// Ищет места вокруг точки.
    ///
    /// Записи без `id`, `name` или с неполными координатами пропускаются.
    pub async fn search_places(
        &self,
        token: &str,
        query: &str,
        lat: f64,
        lng: f64,
        distance_metres: u32,
    ) -> SocialClientResult<Vec<Place>> {
        let raw = self
            .search_raw(token, query, lat, lng, distance_metres)
            .await?;
        Ok(raw.into_iter().filter_map(parse_place).collect())
    }

    async fn search_raw(
        &self,
        token: &str,
        query: &str,
        lat: f64,
        lng: f64,
        distance_metres: u32,
    ) -> SocialClientResult<Vec<Value>> {
        let center = format!("{lat},{lng}");
        let distance = distance_metres.to_string();
        let dto: PlacesDto = self
            .http
            .get_json(
                "search",
                &[
                    ("q", query),
                    ("type", "place"),
                    ("center", center.as_str()),
                    ("distance", distance.as_str()),
                ],
                Some(token),
            )
            .await?;
        Ok(dto.data)
    }

    /// Публикует запись в ленту пользователя и возвращает её идентификатор.
    pub async fn publish(&self, token: &str, post: &FeedPost) -> SocialClientResult<Option<String>> {
        let request = self
            .http
            .client
            .post(self.http.endpoint("me/feed"))
            .bearer_auth(token)
            .form(post);

        let dto: PublishedDto = HttpClient::read_json(self.http.execute(request).await?).await?;
        Ok(dto.id)
    }

    /// Отметка «Hello World»: ищет кофейню рядом и публикует запись с ней.
    ///
    /// Берётся только первая запись поиска. Если её нет или у неё нет
    /// `id`/`name`/координат, публикуется запись без места.
    pub async fn check_in(&self, token: &str, lat: f64, lng: f64) -> SocialClientResult<CheckIn> {
        let first = self
            .search_raw(token, PLACE_QUERY, lat, lng, SEARCH_DISTANCE_METRES)
            .await?
            .into_iter()
            .next();

        let (post, place) = match first.and_then(parse_place) {
            Some(Place {
                id,
                name,
                location: Some(coords),
            }) => (
                FeedPost {
                    message: HELLO_MESSAGE.to_string(),
                    place: Some(id),
                },
                Some(PlaceLocation {
                    name,
                    lat: coords.latitude,
                    lng: coords.longitude,
                }),
            ),
            _ => (
                FeedPost {
                    message: GOODBYE_MESSAGE.to_string(),
                    place: None,
                },
                None,
            ),
        };

        let post_id = self.publish(token, &post).await?;
        debug!(with_place = place.is_some(), "check-in published");
        Ok(CheckIn { post_id, place })
    }
}

fn parse_place(raw: Value) -> Option<Place> {
    match serde_json::from_value(raw) {
        Ok(place) => Some(place),
        Err(err) => {
            debug!(error = %err, "skipping malformed place");
            None
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент локального эндпоинта `/posts`.
pub struct PostsApi {
    http: HttpClient,
}

impl PostsApi {
    /// Создаёт клиент с базовым URL сервера постов.
    pub fn new(base_url: impl Into<String>) -> SocialClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
        })
    }

    /// `GET /posts?access_token=<token>`, тело как JSON.
    pub async fn get_posts(&self, token: &str) -> SocialClientResult<Value> {
        self.http
            .get_json("posts", &[("access_token", token)], None)
            .await
    }
}

#[async_trait]
impl PostsSource for PostsApi {
    async fn fetch_posts(&self, token: &str) -> SocialClientResult<Value> {
        self.get_posts(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:8080/").expect("client");
        let full = client.endpoint("/posts");
        assert_eq!(full, "http://localhost:8080/posts");
    }

    #[test]
    fn graph_base_includes_version() {
        let api = GraphApi::new("https://graph.facebook.com/", "v2.4").expect("client");
        assert_eq!(
            api.http.endpoint("oauth/access_token"),
            "https://graph.facebook.com/v2.4/oauth/access_token"
        );
    }

    #[test]
    fn graph_base_without_version() {
        let api = GraphApi::new("http://127.0.0.1:9000", "").expect("client");
        assert_eq!(api.http.endpoint("me"), "http://127.0.0.1:9000/me");
    }

    #[test]
    fn token_body_accepts_json() {
        let auth = parse_token_body(r#"{"access_token":"abc","token_type":"bearer","expires_in":5183999}"#)
            .expect("token");
        assert_eq!(auth.access_token, "abc");
        assert_eq!(auth.token_type.as_deref(), Some("bearer"));
        assert_eq!(auth.expires_in, Some(5_183_999));
    }

    #[test]
    fn token_body_accepts_form_text() {
        let auth = parse_token_body("access_token=123|abc&expires=3600").expect("token");
        assert_eq!(auth.access_token, "123|abc");
        assert_eq!(auth.expires_in, Some(3600));
    }

    #[test]
    fn place_without_coordinates_is_skipped() {
        let raw = serde_json::json!({"id": "1", "name": "X", "location": {"city": "Paris"}});
        assert!(parse_place(raw).is_none());
        assert!(parse_place(serde_json::json!({"name": "no id"})).is_none());

        let place = parse_place(serde_json::json!({
            "id": "2",
            "name": "Cafe",
            "location": {"latitude": 1.0, "longitude": 2.0, "city": "Paris"}
        }))
        .expect("place");
        assert_eq!(place.id, "2");
        assert!(place.location.is_some());
    }

    #[test]
    fn token_body_without_token_is_none() {
        assert!(parse_token_body(r#"{"error":{"message":"bad code"}}"#).is_none());
        assert!(parse_token_body("expires=10").is_none());
        assert!(parse_token_body("").is_none());
    }
}
