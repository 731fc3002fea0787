//! Cursor-based pagination with a single-flight guard.
//!
//! The pager owns the cursor, the `has_more` flag, and the `loading` guard
//! that keeps at most one fetch in flight. The lock is never held across
//! an await: check/flip the guard, release, perform the request, re-lock
//! and apply.

use std::future::Future;

use parking_lot::Mutex;
use tracing::warn;

use crate::error::ApiError;
use crate::models::{ListItem, Page};
use crate::sync::merge::append_page;

#[derive(Debug, Clone, Default)]
pub struct PagerState {
    pub items: Vec<ListItem>,
    pub cursor: Option<String>,
    pub loading: bool,
    pub has_more: bool,
}

impl PagerState {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            loading: false,
            has_more: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and merged; `added` items were new.
    Appended { added: usize },
    /// A fetch was already in flight; no request was made.
    Busy,
    /// The feed is exhausted; no request was made.
    Exhausted,
}

#[derive(Default)]
pub struct Pager {
    state: Mutex<PagerState>,
}

impl Pager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PagerState::empty()),
        }
    }

    /// Discard all fetched state, e.g. on a category change. The next
    /// fetch starts from the beginning of the feed.
    pub fn reset(&self) {
        *self.state.lock() = PagerState::empty();
    }

    pub fn snapshot(&self) -> PagerState {
        self.state.lock().clone()
    }

    pub fn items(&self) -> Vec<ListItem> {
        self.state.lock().items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().has_more
    }

    /// Drop an item from the fetched set (e.g. after unstarring in the
    /// starred feed).
    pub fn remove_item(&self, id: &str) {
        self.state.lock().items.retain(|item| item.id != id);
    }

    /// Fetch and merge the next page via `fetch`, which receives the
    /// current cursor. Returns `Busy`/`Exhausted` without calling `fetch`
    /// when a request is already in flight or the feed has ended.
    ///
    /// On failure, items and cursor are untouched and `has_more` stays
    /// true so the next trigger can retry.
    pub async fn fetch_next_page<F, Fut>(&self, fetch: F) -> Result<FetchOutcome, ApiError>
    where
        F: FnOnce(Option<String>) -> Fut,
        Fut: Future<Output = Result<Page, ApiError>>,
    {
        let cursor = {
            let mut state = self.state.lock();
            if state.loading {
                return Ok(FetchOutcome::Busy);
            }
            if !state.has_more {
                return Ok(FetchOutcome::Exhausted);
            }
            state.loading = true;
            state.cursor.clone()
        };

        let result = fetch(cursor).await;

        let mut state = self.state.lock();
        state.loading = false;
        match result {
            Ok(page) => {
                state.has_more = !page.is_exhausted();
                state.cursor = page.next_cursor.clone();
                let before = state.items.len();
                let merged = append_page(std::mem::take(&mut state.items), page.items);
                let added = merged.len() - before;
                state.items = merged;
                Ok(FetchOutcome::Appended { added })
            }
            Err(err) => {
                warn!(error = %err, "page fetch failed, state left intact for retry");
                Err(err)
            }
        }
    }
}
