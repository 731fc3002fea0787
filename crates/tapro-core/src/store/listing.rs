//! One canonical list view over the discover and starred feeds.
//!
//! The source app grew three divergent copies of this page; this store is
//! the single implementation: pager + client-side filter + star/follow
//! toggles, parameterized only by which feed endpoint backs it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{Category, ListItem, Page};
use crate::sync::{
    filter_items, should_fetch_more, FetchOutcome, FilterState, Pager, PagerState,
    ScrollGeometry, ToggleOutcome, ToggleTracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    /// Public discovery feed (`POST /api/discover`).
    Discover,
    /// The caller's starred items (`POST /api/starred`).
    Starred,
}

pub struct ListingStore {
    client: Arc<ApiClient>,
    source: FeedSource,
    pager: Pager,
    filter: Mutex<FilterState>,
    starred: ToggleTracker,
    followed: ToggleTracker,
}

impl ListingStore {
    pub fn new(client: Arc<ApiClient>, source: FeedSource) -> Self {
        Self {
            client,
            source,
            pager: Pager::new(),
            filter: Mutex::new(FilterState::new(Category::Startups)),
            starred: ToggleTracker::new(),
            followed: ToggleTracker::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.filter.lock().active_category
    }

    /// Switch tabs. Discards all fetched items and the cursor; the caller
    /// follows up with `load_more` for the initial page of the new tab.
    pub fn set_category(&self, category: Category) {
        let mut filter = self.filter.lock();
        if filter.active_category == category {
            return;
        }
        filter.active_category = category;
        self.pager.reset();
    }

    /// Update the search box. Only re-derives the filtered view; never
    /// fetches.
    pub fn set_query(&self, query: impl Into<String>) {
        self.filter.lock().search_query = query.into();
    }

    pub fn state(&self) -> PagerState {
        self.pager.snapshot()
    }

    pub fn items(&self) -> Vec<ListItem> {
        self.pager.items()
    }

    /// Fetched items with the current search query applied.
    pub fn visible_items(&self) -> Vec<ListItem> {
        let (category, query) = {
            let filter = self.filter.lock();
            (filter.active_category, filter.search_query.clone())
        };
        filter_items(&self.pager.items(), &query, category)
    }

    pub fn is_starred(&self, item_id: &str) -> bool {
        self.starred.contains(item_id)
    }

    pub fn is_followed(&self, item_id: &str) -> bool {
        self.followed.contains(item_id)
    }

    pub async fn load_more(&self) -> Result<FetchOutcome, ApiError> {
        if self.source == FeedSource::Starred && !self.client.is_authenticated() {
            return Err(ApiError::AuthRequired);
        }

        let category = self.category();
        let client = Arc::clone(&self.client);
        let limit = client.config().page_size;
        let source = self.source;

        let outcome = self
            .pager
            .fetch_next_page(move |cursor| async move {
                let page: Page = match source {
                    FeedSource::Discover => {
                        client.discover(category, cursor.as_deref(), limit).await?
                    }
                    FeedSource::Starred => {
                        client.starred(category, cursor.as_deref(), limit).await?
                    }
                };
                Ok(page)
            })
            .await?;

        if self.source == FeedSource::Starred {
            if let FetchOutcome::Appended { .. } = outcome {
                // Everything in the starred feed is starred by definition.
                self.starred
                    .seed(self.pager.items().into_iter().map(|item| item.id));
            }
        }
        Ok(outcome)
    }

    /// Scroll-event entry point: fetches the next page when the viewport
    /// is near the bottom. `Ok(None)` means the geometry did not trigger.
    pub async fn on_scroll(
        &self,
        geometry: ScrollGeometry,
    ) -> Result<Option<FetchOutcome>, ApiError> {
        let threshold = self.client.config().scroll_threshold_px;
        if !should_fetch_more(geometry, threshold) {
            return Ok(None);
        }
        self.load_more().await.map(Some)
    }

    pub async fn toggle_star(&self, item_id: &str) -> ToggleOutcome {
        let item_type = self.category().wire_item_type();
        let client = Arc::clone(&self.client);
        let authenticated = client.is_authenticated();
        let id = item_id.to_string();

        let outcome = self
            .starred
            .toggle(item_id, authenticated, |turning_on| async move {
                if turning_on {
                    client.star(&id, item_type).await
                } else {
                    client.unstar(&id, item_type).await
                }
            })
            .await;

        // The starred feed lists only starred items, so a confirmed unstar
        // also removes the card.
        if self.source == FeedSource::Starred {
            if let ToggleOutcome::Confirmed { now_on: false } = outcome {
                self.pager.remove_item(item_id);
            }
        }
        outcome
    }

    pub async fn toggle_follow(&self, item_id: &str) -> ToggleOutcome {
        let target_type = self.category().wire_item_type();
        let client = Arc::clone(&self.client);
        let authenticated = client.is_authenticated();
        let id = item_id.to_string();

        self.followed
            .toggle(item_id, authenticated, |turning_on| async move {
                if turning_on {
                    client.follow(&id, target_type).await
                } else {
                    client.unfollow(&id, target_type).await
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::mock::{page_reply, MockTransport, Reply};
    use crate::config::CoreConfig;
    use crate::session::Session;
    use serde_json::json;

    fn discover_store(transport: Arc<MockTransport>) -> ListingStore {
        let client = Arc::new(ApiClient::new(transport, CoreConfig::default()));
        ListingStore::new(client, FeedSource::Discover)
    }

    fn logged_in(client: &ApiClient) {
        client.set_session(Some(Session {
            access_token: "a1".to_string(),
            refresh_token: None,
            user: None,
        }));
    }

    #[tokio::test]
    async fn test_pages_accumulate_without_duplicates() {
        let transport = MockTransport::new();
        let ids1: Vec<String> = (0..10).map(|i| format!("a{i}")).collect();
        let ids2: Vec<String> = (0..10).map(|i| format!("b{i}")).collect();
        transport.push(page_reply(
            &ids1.iter().map(String::as_str).collect::<Vec<_>>(),
            Some("c1"),
        ));
        transport.push(page_reply(
            &ids2.iter().map(String::as_str).collect::<Vec<_>>(),
            Some("c2"),
        ));
        transport.push(page_reply(&["x0", "x1", "x2"], Some("c3")));
        transport.push(page_reply(&[], None));
        let store = discover_store(Arc::clone(&transport));

        for _ in 0..4 {
            store.load_more().await.unwrap();
        }

        let state = store.state();
        assert_eq!(state.items.len(), 23);
        assert!(!state.has_more);
        assert_eq!(transport.call_count(), 4);
    }

    #[tokio::test]
    async fn test_category_change_resets_before_fetch() {
        let transport = MockTransport::new();
        transport.push(page_reply(&["s1", "s2"], Some("c1")));
        let store = discover_store(Arc::clone(&transport));

        store.load_more().await.unwrap();
        assert_eq!(store.items().len(), 2);

        store.set_category(Category::Investors);

        // Cleared synchronously, before any new request goes out.
        let state = store.state();
        assert!(state.items.is_empty());
        assert!(state.cursor.is_none());
        assert!(state.has_more);
        assert_eq!(transport.call_count(), 1);

        transport.push(page_reply(&["i1"], None));
        store.load_more().await.unwrap();
        let body = transport.last_request().unwrap().body.unwrap();
        assert_eq!(body["type"], "investor");
        assert_eq!(body["lastDocId"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_same_category_is_a_no_op() {
        let transport = MockTransport::new();
        transport.push(page_reply(&["s1"], Some("c1")));
        let store = discover_store(Arc::clone(&transport));
        store.load_more().await.unwrap();

        store.set_category(Category::Startups);
        assert_eq!(store.items().len(), 1);
    }

    #[tokio::test]
    async fn test_search_never_touches_the_network() {
        let transport = MockTransport::new();
        transport.push(Reply::Json(json!({
            "data": [
                {"id": "1", "startupName": "Acme", "location": "Berlin"},
                {"id": "2", "startupName": "Globex", "location": "Pune"},
                {"id": "3", "startupName": "Initech", "location": "Austin"},
                {"id": "4", "startupName": "Umbrella", "location": "Raccoon City"},
                {"id": "5", "startupName": "Hooli", "location": "Palo Alto"},
            ],
            "lastDocId": "5",
        })));
        let store = discover_store(Arc::clone(&transport));
        store.load_more().await.unwrap();
        assert_eq!(transport.call_count(), 1);

        store.set_query("glob");
        let visible = store.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "2");
        assert_eq!(store.items().len(), 5);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_scroll_trigger_gates_on_geometry() {
        let transport = MockTransport::new();
        transport.push(page_reply(&["s1"], Some("c1")));
        let store = discover_store(Arc::clone(&transport));

        let far = ScrollGeometry {
            viewport_height: 800,
            scroll_offset: 0,
            content_height: 5000,
        };
        assert!(store.on_scroll(far).await.unwrap().is_none());
        assert_eq!(transport.call_count(), 0);

        let near = ScrollGeometry {
            viewport_height: 800,
            scroll_offset: 4000,
            content_height: 5000,
        };
        let outcome = store.on_scroll(near).await.unwrap();
        assert!(matches!(outcome, Some(FetchOutcome::Appended { added: 1 })));
    }

    #[tokio::test]
    async fn test_unauthenticated_star_makes_no_call() {
        let transport = MockTransport::new();
        let store = discover_store(Arc::clone(&transport));

        let outcome = store.toggle_star("s1").await;
        assert!(matches!(outcome, ToggleOutcome::AuthRequired));
        assert_eq!(transport.call_count(), 0);
        assert!(!store.is_starred("s1"));
    }

    #[tokio::test]
    async fn test_star_rollback_on_server_error() {
        let transport = MockTransport::new();
        transport.push(Reply::Status(500, "server error"));
        let store = discover_store(Arc::clone(&transport));
        logged_in(&store.client);

        let outcome = store.toggle_star("s1").await;
        assert!(matches!(outcome, ToggleOutcome::RolledBack { .. }));
        assert!(!store.is_starred("s1"));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_star_sends_item_type() {
        let transport = MockTransport::new();
        transport.push(Reply::Json(json!({"message": "ok"})));
        let store = discover_store(Arc::clone(&transport));
        logged_in(&store.client);
        store.set_category(Category::Investors);

        let outcome = store.toggle_star("i1").await;
        assert!(matches!(outcome, ToggleOutcome::Confirmed { now_on: true }));
        assert!(store.is_starred("i1"));

        let request = transport.last_request().unwrap();
        assert_eq!(request.path, "/api/star");
        assert_eq!(request.body.unwrap()["itemType"], "investor");
    }

    #[tokio::test]
    async fn test_starred_feed_requires_session() {
        let transport = MockTransport::new();
        let client = Arc::new(ApiClient::new(
            Arc::clone(&transport) as Arc<dyn crate::api::Transport>,
            CoreConfig::default(),
        ));
        let store = ListingStore::new(client, FeedSource::Starred);

        let err = store.load_more().await.unwrap_err();
        assert!(matches!(err, ApiError::AuthRequired));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unstar_removes_from_starred_feed() {
        let transport = MockTransport::new();
        transport.push(page_reply(&["s1", "s2"], Some("c1")));
        transport.push(Reply::Json(json!({"message": "Unstarred successfully"})));
        let client = Arc::new(ApiClient::new(
            Arc::clone(&transport) as Arc<dyn crate::api::Transport>,
            CoreConfig::default(),
        ));
        logged_in(&client);
        let store = ListingStore::new(client, FeedSource::Starred);

        store.load_more().await.unwrap();
        assert!(store.is_starred("s1"));

        let outcome = store.toggle_star("s1").await;
        assert!(matches!(outcome, ToggleOutcome::Confirmed { now_on: false }));
        let remaining = store.items();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "s2");
    }
}
