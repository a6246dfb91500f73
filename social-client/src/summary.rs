use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SocialClientError, SocialClientResult};
use crate::models::{PostsList, PostsSummary};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Формат ответа `/posts`, который ожидает поток входа.
pub enum PostsVariant {
    /// Объект `{total, fake}`.
    #[default]
    Counts,
    /// Массив постов.
    List,
    /// Запрос постов не выполняется.
    Disabled,
}

impl PostsVariant {
    /// `true`, если поток должен запрашивать `/posts`.
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Разбирает тело ответа `/posts` в отчёт.
    ///
    /// Для `Disabled` возвращает `None`: отчёт не строится.
    pub fn summarize(self, body: Value) -> SocialClientResult<Option<PostsReport>> {
        match self {
            Self::Counts => summarize_counts(body).map(Some),
            Self::List => summarize_list(body).map(Some),
            Self::Disabled => Ok(None),
        }
    }
}

impl FromStr for PostsVariant {
    type Err = SocialClientError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "counts" | "a" => Ok(Self::Counts),
            "list" | "b" => Ok(Self::List),
            "disabled" | "none" | "c" => Ok(Self::Disabled),
            other => Err(SocialClientError::InvalidRequest(format!(
                "unknown posts variant '{other}', expected counts, list or disabled"
            ))),
        }
    }
}

impl fmt::Display for PostsVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Counts => "counts",
            Self::List => "list",
            Self::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
/// Сводка по постам в одном из двух форматов.
pub enum PostsReport {
    /// Счётчики `{total, fake}`.
    Counts(PostsSummary),
    /// Список постов.
    List(PostsList),
}

impl PostsReport {
    /// Сообщение для пользователя.
    pub fn message(&self) -> String {
        match self {
            Self::Counts(summary) => format!(
                "Found {} posts, {} of which are likely fake.",
                summary.total, summary.fake
            ),
            Self::List(list) => format!("Found {} posts", list.len()),
        }
    }
}

/// Сводка для ответа вида `{"total": N, "fake": M}`.
pub fn summarize_counts(body: Value) -> SocialClientResult<PostsReport> {
    if !body.is_object() {
        return Err(SocialClientError::UnexpectedPayload(format!(
            "expected an object with total and fake, got {}",
            json_kind(&body)
        )));
    }
    let summary: PostsSummary = serde_json::from_value(body)?;
    Ok(PostsReport::Counts(summary))
}

/// Сводка для ответа-массива.
pub fn summarize_list(body: Value) -> SocialClientResult<PostsReport> {
    match body {
        Value::Array(posts) => Ok(PostsReport::List(PostsList { posts })),
        other => Err(SocialClientError::UnexpectedPayload(format!(
            "expected an array of posts, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_message_matches_wording() {
        let report = summarize_counts(json!({"total": 10, "fake": 3})).expect("counts");
        assert_eq!(report.message(), "Found 10 posts, 3 of which are likely fake.");
    }

    #[test]
    fn list_message_counts_entries() {
        let report = summarize_list(json!([{}, {}, {}])).expect("list");
        assert_eq!(report.message(), "Found 3 posts");
    }

    #[test]
    fn empty_list_is_zero_posts() {
        let report = summarize_list(json!([])).expect("list");
        assert_eq!(report.message(), "Found 0 posts");
    }

    #[test]
    fn counts_rejects_array() {
        let err = summarize_counts(json!([1, 2])).expect_err("must fail");
        assert!(matches!(err, SocialClientError::UnexpectedPayload(_)));
    }

    #[test]
    fn counts_rejects_missing_field() {
        let err = summarize_counts(json!({"total": 4})).expect_err("must fail");
        assert!(matches!(err, SocialClientError::Json(_)));
    }

    #[test]
    fn counts_accept_whole_floats() {
        let report = summarize_counts(json!({"total": 10.0, "fake": 3.0})).expect("counts");
        assert_eq!(report.message(), "Found 10 posts, 3 of which are likely fake.");
    }

    #[test]
    fn counts_reject_fractions_and_negatives() {
        let err = summarize_counts(json!({"total": 2.5, "fake": 0})).expect_err("must fail");
        assert!(matches!(err, SocialClientError::Json(_)));
        let err = summarize_counts(json!({"total": 3, "fake": -1})).expect_err("must fail");
        assert!(matches!(err, SocialClientError::Json(_)));
    }

    #[test]
    fn list_rejects_object() {
        let err = summarize_list(json!({"total": 1, "fake": 0})).expect_err("must fail");
        assert!(matches!(err, SocialClientError::UnexpectedPayload(_)));
    }

    #[test]
    fn disabled_variant_builds_nothing() {
        let report = PostsVariant::Disabled
            .summarize(json!({"total": 1, "fake": 0}))
            .expect("disabled");
        assert!(report.is_none());
    }

    #[test]
    fn variant_parses_aliases() {
        assert_eq!("A".parse::<PostsVariant>().expect("a"), PostsVariant::Counts);
        assert_eq!("list".parse::<PostsVariant>().expect("b"), PostsVariant::List);
        assert_eq!("none".parse::<PostsVariant>().expect("c"), PostsVariant::Disabled);
        assert!("posts".parse::<PostsVariant>().is_err());
    }
}
