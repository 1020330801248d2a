//! Social platform record types
//!
//! Feed, comment, search and profile payloads arrive in slightly different
//! shapes depending on the endpoint: content may live under `content` or only
//! under `title`, authors may carry `name` or only `username`, and ids may be
//! strings or numbers. The raw records below spell out which fields are
//! required and which are optional, and [`FeedItem`] / [`ThreadComment`] hold
//! the single normalization of those fallbacks.

use serde::{Deserialize, Deserializer, Serialize};

/// Author reference embedded in posts and comments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorRef {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
}

impl AuthorRef {
    /// Create an author reference with a display name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            username: None,
        }
    }

    /// Display name, falling back to the username
    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.name.as_deref()).or_else(|| non_blank(self.username.as_deref()))
    }
}

/// Raw post as returned by feed and search endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub author: Option<AuthorRef>,

    /// Only present on semantic search results
    #[serde(default)]
    pub similarity: Option<f64>,
}

impl PostRecord {
    /// Convenience constructor used by callers building records by hand
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: Some(content.into()),
            title: None,
            author: Some(AuthorRef::named(author)),
            similarity: None,
        }
    }
}

/// Raw comment as returned by the post comments endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub author: Option<AuthorRef>,
}

impl CommentRecord {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: Some(content.into()),
            author: Some(AuthorRef::named(author)),
        }
    }
}

/// Agent profile summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub name: Option<String>,

    /// Whole points; fractional values are truncated
    #[serde(default, deserialize_with = "deserialize_karma")]
    pub karma: i64,

    #[serde(default, rename = "recentPosts", deserialize_with = "deserialize_list")]
    pub recent_posts: Vec<serde_json::Value>,
}

/// Normalized post the decision engine works with
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub id: String,

    /// Post content, or the title when the content is missing or blank
    pub text: String,

    /// Author display name, or username when the name is missing
    pub author: Option<String>,

    pub similarity: Option<f64>,
}

impl FeedItem {
    /// Author name for log and journal lines
    pub fn author_label(&self) -> &str {
        self.author.as_deref().unwrap_or("unknown")
    }
}

impl From<PostRecord> for FeedItem {
    fn from(record: PostRecord) -> Self {
        let text = non_blank(record.content.as_deref())
            .or_else(|| non_blank(record.title.as_deref()))
            .unwrap_or_default()
            .to_string();
        let author = record
            .author
            .as_ref()
            .and_then(AuthorRef::display_name)
            .map(str::to_string);

        Self {
            id: record.id,
            text,
            author,
            similarity: record.similarity,
        }
    }
}

/// Normalized comment in a post thread
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadComment {
    pub id: String,
    pub text: String,
    pub author: Option<String>,
}

impl ThreadComment {
    pub fn author_label(&self) -> &str {
        self.author.as_deref().unwrap_or("unknown")
    }
}

impl From<CommentRecord> for ThreadComment {
    fn from(record: CommentRecord) -> Self {
        Self {
            text: non_blank(record.content.as_deref())
                .unwrap_or_default()
                .to_string(),
            author: record
                .author
                .as_ref()
                .and_then(AuthorRef::display_name)
                .map(str::to_string),
            id: record.id,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Accept both `"id": "abc"` and `"id": 42`
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Any JSON number (or null) as whole karma points
fn deserialize_karma<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(0),
        serde_json::Value::Number(n) => Ok(n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default()),
        other => Err(serde::de::Error::custom(format!(
            "expected numeric karma, got {}",
            other
        ))),
    }
}

/// A list that may also arrive as `null`
fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default())
}
