use serde::{Deserialize, Serialize};

/// A direct-message thread as listed in the sidebar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub online: bool,
}

impl Conversation {
    /// Sidebar search: case-insensitive substring over the peer name and
    /// the last-message preview.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        if self.name.to_lowercase().contains(&needle) {
            return true;
        }
        self.last_message
            .as_deref()
            .is_some_and(|preview| preview.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub is_self: bool,
    #[serde(rename = "message")]
    pub body: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}
