use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Ответ после успешного входа.
pub struct AuthResponse {
    /// Токен доступа пользователя.
    pub access_token: String,
    /// Тип токена (обычно `bearer`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Время жизни токена в секундах.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl AuthResponse {
    /// Создаёт ответ только с токеном доступа.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: None,
            expires_in: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Профиль пользователя, полученный из `/me`.
pub struct Profile {
    /// Отображаемое имя.
    pub name: String,
    /// Идентификатор пользователя в Graph API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Счётчики постов, которые возвращает `/posts` в формате `{total, fake}`.
///
/// Принимаются целые числа, в том числе записанные как `10.0`.
pub struct PostsSummary {
    /// Всего постов.
    #[serde(deserialize_with = "whole_count")]
    pub total: u64,
    /// Из них, вероятно, фейковых.
    #[serde(deserialize_with = "whole_count")]
    pub fake: u64,
}

fn whole_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(count) = number.as_u64() {
        return Ok(count);
    }
    match number.as_f64() {
        Some(value) if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 => {
            Ok(value as u64)
        }
        _ => Err(D::Error::custom(format!(
            "expected a non-negative whole number, got {number}"
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
/// Список постов, который возвращает `/posts` в формате массива.
pub struct PostsList {
    /// Записи постов как есть; используется только их количество.
    pub posts: Vec<serde_json::Value>,
}

impl PostsList {
    /// Количество постов.
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// `true`, если постов нет.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Место из поиска Graph API.
pub struct Place {
    /// Идентификатор места.
    pub id: String,
    /// Название.
    pub name: String,
    /// Координаты.
    pub location: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Координаты места.
pub struct Coordinates {
    /// Широта.
    pub latitude: f64,
    /// Долгота.
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Место, к которому привязана публикация.
pub struct PlaceLocation {
    /// Название места.
    pub name: String,
    /// Широта.
    pub lat: f64,
    /// Долгота.
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Публикация в ленту пользователя.
pub struct FeedPost {
    /// Текст публикации.
    pub message: String,
    /// Идентификатор места, если оно найдено.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Результат отметки «Hello World».
pub struct CheckIn {
    /// Идентификатор созданной публикации.
    pub post_id: Option<String>,
    /// Место, если публикация привязана к нему.
    pub place: Option<PlaceLocation>,
}
