use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted feed entry. Rows are never updated, only inserted and trimmed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One event as enqueued by the marketplace watcher.
///
/// Deserializes from either the positional form
/// `["content", "url", "text", "buy_url", "buy_text"]` or an object.
/// Only `content` and `url` are used here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Notification {
    pub content: String,
    pub url: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub buy_url: Option<String>,
    #[serde(default)]
    pub buy_text: Option<String>,
}

impl Notification {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            url: url.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_positional_shape() {
        let n: Notification =
            serde_json::from_str(r#"["body", "http://a", "txt", "http://buy", "Buy"]"#).unwrap();
        assert_eq!(n.content, "body");
        assert_eq!(n.url, "http://a");
        assert_eq!(n.buy_url.as_deref(), Some("http://buy"));
    }

    #[test]
    fn decodes_object_shape_without_optional_fields() {
        let n: Notification = serde_json::from_str(r#"{"content": "body", "url": "http://a"}"#).unwrap();
        assert_eq!(n, Notification::new("body", "http://a"));
    }
}
