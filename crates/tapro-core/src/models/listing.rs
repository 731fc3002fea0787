//! Feed items and pages.
//!
//! The sync core only interprets an item's `id`; every other field is
//! display data carried through opaquely.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;

/// One of the three discoverable profile collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Startups,
    Investors,
    Users,
}

impl Category {
    /// Collection tag the feed endpoints expect. The singular/plural
    /// mismatch ("startup" vs "users") is the wire contract.
    pub fn wire_type(&self) -> &'static str {
        match self {
            Self::Startups => "startup",
            Self::Investors => "investor",
            Self::Users => "users",
        }
    }

    /// Type tag the star/follow endpoints expect.
    pub fn wire_item_type(&self) -> &'static str {
        match self {
            Self::Startups => "startup",
            Self::Investors => "investor",
            Self::Users => "user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "startup" | "startups" => Some(Self::Startups),
            "investor" | "investors" => Some(Self::Investors),
            "user" | "users" => Some(Self::Users),
            _ => None,
        }
    }
}

/// An item in a discover/starred feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ListItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// First entry of the `category` array, when present.
    pub fn category_tag(&self) -> Option<&str> {
        self.fields
            .get("category")
            .and_then(Value::as_array)
            .and_then(|tags| tags.first())
            .and_then(Value::as_str)
    }

    pub fn display_name(&self) -> &str {
        self.text("fullName")
            .or_else(|| self.text("startupName"))
            .unwrap_or("Anonymous")
    }

    pub fn summary(&self) -> Option<&str> {
        self.text("tagline")
            .or_else(|| self.text("about"))
            .or_else(|| self.text("bio"))
    }

    /// Every item must carry a stable id. Anything arriving without one
    /// gets a synthesized UUID rather than a positional key, so two
    /// id-less items can never collide.
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
    }
}

/// One page of a cursor-paginated feed.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<ListItem>,
    pub next_cursor: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageWire {
    #[serde(default)]
    data: Vec<ListItem>,
    #[serde(default)]
    last_doc_id: Option<String>,
}

impl Page {
    pub fn from_response(value: Value) -> Result<Self, ApiError> {
        let wire: PageWire =
            serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
        let mut items = wire.data;
        for item in &mut items {
            item.ensure_id();
        }
        Ok(Page {
            items,
            next_cursor: wire.last_doc_id,
        })
    }

    /// The backend signals exhaustion with an empty page, not an explicit
    /// flag, so an empty page is terminal even when a cursor is present.
    pub fn is_exhausted(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_from_response() {
        let page = Page::from_response(json!({
            "data": [
                {"id": "s1", "startupName": "Acme", "tagline": "rockets"},
                {"id": "s2", "startupName": "Globex"},
            ],
            "lastDocId": "s2",
        }))
        .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("s2"));
        assert!(!page.is_exhausted());
        assert_eq!(page.items[0].display_name(), "Acme");
        assert_eq!(page.items[0].summary(), Some("rockets"));
    }

    #[test]
    fn test_missing_id_gets_synthesized() {
        let page = Page::from_response(json!({
            "data": [{"startupName": "NoId"}, {"startupName": "AlsoNoId"}],
            "lastDocId": null,
        }))
        .unwrap();

        assert!(!page.items[0].id.is_empty());
        assert!(!page.items[1].id.is_empty());
        assert_ne!(page.items[0].id, page.items[1].id);
    }

    #[test]
    fn test_empty_page_is_exhausted() {
        let page = Page::from_response(json!({"data": [], "lastDocId": null})).unwrap();
        assert!(page.is_exhausted());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_category_wire_tags() {
        assert_eq!(Category::Startups.wire_type(), "startup");
        assert_eq!(Category::Users.wire_type(), "users");
        assert_eq!(Category::Users.wire_item_type(), "user");
        assert_eq!(Category::parse("Investors"), Some(Category::Investors));
        assert_eq!(Category::parse("startup"), Some(Category::Startups));
        assert_eq!(Category::parse("bogus"), None);
    }

    #[test]
    fn test_category_tag_reads_first_entry() {
        let item: ListItem =
            serde_json::from_value(json!({"id": "x", "category": ["Fintech", "AI"]})).unwrap();
        assert_eq!(item.category_tag(), Some("Fintech"));
    }
}
