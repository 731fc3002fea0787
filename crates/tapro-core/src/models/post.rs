use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Post categories used by the explore feed filter tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Thought,
    Funding,
    Announcement,
    Insight,
}

impl PostKind {
    pub fn wire(&self) -> &'static str {
        match self {
            Self::Thought => "thought",
            Self::Funding => "funding",
            Self::Announcement => "announcement",
            Self::Insight => "insight",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "thought" => Some(Self::Thought),
            "funding" => Some(Self::Funding),
            "announcement" => Some(Self::Announcement),
            "insight" => Some(Self::Insight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub author: PostAuthor,
    pub text: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub likes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub author: PostAuthor,
    pub content: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub shares: u32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub post_time: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<PostKind>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Payload for `POST /api/posts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub hashtags: Vec<String>,
    pub images: Vec<String>,
}

// Older posts carry numeric ids; the backend moved to string ids without
// migrating existing documents.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
