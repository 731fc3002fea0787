//! Client-side substring filtering over already-fetched items.
//!
//! Filtering is a pure view over the pager's items: typing a query never
//! triggers a fetch, unlike a category change, which resets the pager.

use serde::{Deserialize, Serialize};

use crate::models::{Category, ListItem};

/// Current tab and search box contents for one list view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterState {
    pub active_category: Category,
    pub search_query: String,
}

impl FilterState {
    pub fn new(category: Category) -> Self {
        Self {
            active_category: category,
            search_query: String::new(),
        }
    }
}

/// Text fields consulted per category: name/title, description, location,
/// and the category/role tag.
fn candidate_fields(category: Category) -> &'static [&'static str] {
    match category {
        Category::Startups => &["startupName", "tagline", "about", "location", "fundingRound"],
        Category::Investors => &["fullName", "bio", "about", "location", "investorType"],
        Category::Users => &["fullName", "bio", "location", "role", "lookingFor"],
    }
}

/// Case-insensitive substring match over the category's candidate fields.
/// An empty or whitespace-only query matches everything.
pub fn matches_query(item: &ListItem, category: Category, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let mut texts: Vec<&str> = candidate_fields(category)
        .iter()
        .filter_map(|field| item.text(field))
        .collect();
    if category == Category::Startups {
        if let Some(tag) = item.category_tag() {
            texts.push(tag);
        }
    }

    texts
        .iter()
        .any(|text| text.to_lowercase().contains(&needle))
}

pub fn filter_items(items: &[ListItem], query: &str, category: Category) -> Vec<ListItem> {
    if query.trim().is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| matches_query(item, category, query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn startup(id: &str, name: &str, location: &str) -> ListItem {
        serde_json::from_value(json!({
            "id": id,
            "startupName": name,
            "tagline": "building things",
            "location": location,
            "category": ["Fintech"],
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_query_returns_all() {
        let items = vec![startup("a", "Acme", "Berlin"), startup("b", "Globex", "Pune")];
        assert_eq!(filter_items(&items, "", Category::Startups).len(), 2);
        assert_eq!(filter_items(&items, "   ", Category::Startups).len(), 2);
    }

    #[test]
    fn test_case_insensitive_name_match() {
        let items = vec![startup("a", "Acme", "Berlin"), startup("b", "Globex", "Pune")];
        let hits = filter_items(&items, "aCmE", Category::Startups);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }

    #[test]
    fn test_matches_location_and_category_tag() {
        let items = vec![startup("a", "Acme", "Berlin"), startup("b", "Globex", "Pune")];
        assert_eq!(filter_items(&items, "pune", Category::Startups).len(), 1);
        assert_eq!(filter_items(&items, "fintech", Category::Startups).len(), 2);
    }

    #[test]
    fn test_investor_fields() {
        let investor: ListItem = serde_json::from_value(json!({
            "id": "i1",
            "fullName": "Warren Buffett",
            "investorType": "Angel",
            "location": "Omaha",
        }))
        .unwrap();
        assert!(matches_query(&investor, Category::Investors, "angel"));
        assert!(matches_query(&investor, Category::Investors, "buffett"));
        assert!(!matches_query(&investor, Category::Investors, "berlin"));
    }

    #[test]
    fn test_no_match_on_unlisted_fields() {
        let item: ListItem =
            serde_json::from_value(json!({"id": "x", "secretField": "needle"})).unwrap();
        assert!(!matches_query(&item, Category::Users, "needle"));
    }
}
