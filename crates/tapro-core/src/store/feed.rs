//! Explore feed: posts with optimistic like/bookmark/comment/create.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{Comment, NewPost, Post, PostAuthor, PostKind};
use crate::sync::{ToggleOutcome, ToggleTracker};

pub struct FeedStore {
    client: Arc<ApiClient>,
    posts: Mutex<Vec<Post>>,
    active_filter: Mutex<Option<PostKind>>,
    liked: ToggleTracker,
    bookmarked: ToggleTracker,
}

impl FeedStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            posts: Mutex::new(Vec::new()),
            active_filter: Mutex::new(None),
            liked: ToggleTracker::new(),
            bookmarked: ToggleTracker::new(),
        }
    }

    pub fn posts(&self) -> Vec<Post> {
        self.posts.lock().clone()
    }

    pub fn active_filter(&self) -> Option<PostKind> {
        *self.active_filter.lock()
    }

    pub fn is_liked(&self, post_id: &str) -> bool {
        self.liked.contains(post_id)
    }

    pub fn is_bookmarked(&self, post_id: &str) -> bool {
        self.bookmarked.contains(post_id)
    }

    /// Fetch the feed for the current filter, replacing local posts.
    /// Returns the number of posts loaded.
    pub async fn load(&self) -> Result<usize, ApiError> {
        let filter = self.active_filter();
        let posts = self.client.posts(filter, None).await?;
        self.liked.replace(
            posts
                .iter()
                .filter(|post| post.is_liked)
                .map(|post| post.id.clone()),
        );
        let count = posts.len();
        *self.posts.lock() = posts;
        Ok(count)
    }

    /// Filter tabs refetch from the server, unlike the listing search box.
    pub async fn set_filter(&self, filter: Option<PostKind>) -> Result<usize, ApiError> {
        *self.active_filter.lock() = filter;
        self.load().await
    }

    /// Publish a post. The post appears at the top of the feed
    /// immediately under a synthesized id, which the server id replaces
    /// on success. On failure the optimistic post stays visible and the
    /// error is surfaced for display.
    pub async fn create_post(
        &self,
        content: &str,
        kind: PostKind,
        hashtags: Vec<String>,
        images: Vec<String>,
    ) -> Result<Post, ApiError> {
        let session = self.client.session().ok_or(ApiError::AuthRequired)?;
        let local_id = Uuid::new_v4().to_string();
        let optimistic = Post {
            id: local_id.clone(),
            author: PostAuthor {
                id: session.user_id().unwrap_or_default().to_string(),
                name: session.display_name().to_string(),
                role: None,
                avatar: None,
                is_verified: false,
            },
            content: content.to_string(),
            hashtags: hashtags.clone(),
            likes: 0,
            comments: Vec::new(),
            shares: 0,
            is_liked: false,
            post_time: Some("Just now".to_string()),
            kind: Some(kind),
            image: images.first().cloned(),
        };
        self.posts.lock().insert(0, optimistic);

        let new_post = NewPost {
            content: content.to_string(),
            kind,
            hashtags,
            images,
        };
        match self.client.create_post(&new_post).await {
            Ok(created) => {
                let mut posts = self.posts.lock();
                if let Some(post) = posts.iter_mut().find(|post| post.id == local_id) {
                    post.id = created.id.clone();
                }
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "post creation failed, optimistic copy kept");
                Err(err)
            }
        }
    }

    pub async fn like(&self, post_id: &str) -> ToggleOutcome {
        if !self.client.is_authenticated() {
            return ToggleOutcome::AuthRequired;
        }

        let turning_on = !self.liked.contains(post_id);
        self.adjust_like(post_id, turning_on);

        let client = Arc::clone(&self.client);
        let id = post_id.to_string();
        let outcome = self
            .liked
            .toggle(post_id, true, |_| async move { client.like_post(&id).await })
            .await;

        if matches!(outcome, ToggleOutcome::RolledBack { .. }) {
            self.adjust_like(post_id, !turning_on);
        }
        outcome
    }

    fn adjust_like(&self, post_id: &str, liked: bool) {
        let mut posts = self.posts.lock();
        if let Some(post) = posts.iter_mut().find(|post| post.id == post_id) {
            post.is_liked = liked;
            post.likes = if liked {
                post.likes + 1
            } else {
                post.likes.saturating_sub(1)
            };
        }
    }

    pub async fn bookmark(&self, post_id: &str) -> ToggleOutcome {
        let client = Arc::clone(&self.client);
        let authenticated = client.is_authenticated();
        let id = post_id.to_string();
        self.bookmarked
            .toggle(post_id, authenticated, |_| async move {
                client.bookmark_post(&id).await
            })
            .await
    }

    /// Optimistically append a comment, then confirm with the server. The
    /// optimistic copy stays on failure; the caller decides what to show.
    pub async fn comment(&self, post_id: &str, text: &str) -> Result<(), ApiError> {
        let session = self.client.session().ok_or(ApiError::AuthRequired)?;
        let comment = Comment {
            author: PostAuthor {
                id: session.user_id().unwrap_or_default().to_string(),
                name: session.display_name().to_string(),
                role: None,
                avatar: None,
                is_verified: false,
            },
            text: text.to_string(),
            time: Some("Just now".to_string()),
            likes: 0,
        };
        {
            let mut posts = self.posts.lock();
            if let Some(post) = posts.iter_mut().find(|post| post.id == post_id) {
                post.comments.push(comment);
            }
        }

        self.client
            .comment_post(post_id, text)
            .await
            .inspect_err(|err| warn!(error = %err, "comment failed, optimistic copy kept"))
    }
}
