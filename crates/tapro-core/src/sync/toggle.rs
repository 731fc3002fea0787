//! Optimistic toggling of binary user relations (starred, followed,
//! liked, bookmarked).
//!
//! Membership flips locally before the request is sent, so the UI never
//! waits on the network. Rapid repeated toggles on the same id are
//! resolved with a per-id generation counter: only the response for the
//! latest toggle may touch state, stale responses are discarded. A failed
//! current-generation request restores the pre-toggle membership exactly.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use parking_lot::Mutex;
use tracing::warn;

use crate::error::ApiError;

#[derive(Debug)]
pub enum ToggleOutcome {
    /// Server confirmed; the optimistic state stands.
    Confirmed { now_on: bool },
    /// Request failed; membership was restored to its pre-toggle value.
    RolledBack { error: ApiError },
    /// A later toggle for the same id owns the state; this response was
    /// discarded.
    Superseded,
    /// No session. Nothing was changed and no request was made; callers
    /// should route to a login entry point.
    AuthRequired,
}

#[derive(Default)]
struct Inner {
    members: HashSet<String>,
    generations: HashMap<String, u64>,
}

#[derive(Default)]
pub struct ToggleTracker {
    inner: Mutex<Inner>,
}

impl ToggleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().members.contains(id)
    }

    /// Add confirmed memberships, e.g. from freshly fetched server data.
    pub fn seed<I>(&self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.inner.lock().members.extend(ids);
    }

    /// Replace all memberships with `ids`. Generations are kept so
    /// in-flight toggles still resolve against the right counter.
    pub fn replace<I>(&self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut inner = self.inner.lock();
        inner.members = ids.into_iter().collect();
    }

    /// Flip membership of `id` optimistically, then run `send` with the
    /// direction of the flip (`true` = turning the relation on).
    pub async fn toggle<F, Fut>(&self, id: &str, authenticated: bool, send: F) -> ToggleOutcome
    where
        F: FnOnce(bool) -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        if !authenticated {
            return ToggleOutcome::AuthRequired;
        }

        let (turning_on, generation) = {
            let mut inner = self.inner.lock();
            let turning_on = !inner.members.contains(id);
            if turning_on {
                inner.members.insert(id.to_string());
            } else {
                inner.members.remove(id);
            }
            let counter = inner.generations.entry(id.to_string()).or_insert(0);
            *counter += 1;
            (turning_on, *counter)
        };

        let result = send(turning_on).await;

        let mut inner = self.inner.lock();
        if inner.generations.get(id) != Some(&generation) {
            return ToggleOutcome::Superseded;
        }
        match result {
            Ok(()) => ToggleOutcome::Confirmed { now_on: turning_on },
            Err(error) => {
                warn!(id, error = %error, "toggle request failed, reverting");
                if turning_on {
                    inner.members.remove(id);
                } else {
                    inner.members.insert(id.to_string());
                }
                ToggleOutcome::RolledBack { error }
            }
        }
    }
}
