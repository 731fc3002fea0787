//! Application-wide constants
//!
//! Centralized location for magic values shared across modules.

/// Default backend base URL (development server).
pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

/// Items requested per page from the discover/starred feeds.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Distance from the bottom of the content, in pixels, at which the next
/// page is requested.
pub const SCROLL_THRESHOLD_PX: u32 = 300;

/// Interval between chat polls. The messaging view polls rather than
/// holding a push channel open.
pub const CHAT_POLL_INTERVAL_SECS: u64 = 3;

/// Per-request deadline. A request with no deadline can leave a pager
/// stuck in its loading state forever, so every transport arms one.
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Conversation previews are truncated to this many characters.
pub const PREVIEW_MAX_CHARS: usize = 30;

// Backend routes
pub mod paths {
    pub const AUTH_REGISTER: &str = "/api/auth/register";
    pub const AUTH_LOGIN: &str = "/api/auth/login";
    pub const AUTH_LOGOUT: &str = "/api/auth/logout";
    pub const AUTH_REFRESH: &str = "/api/auth/refresh";
    pub const AUTH_ME: &str = "/api/auth/me";

    pub const DISCOVER: &str = "/api/discover";
    pub const STARRED: &str = "/api/starred";
    pub const STAR: &str = "/api/star";
    pub const UNSTAR: &str = "/api/unstar";
    pub const FOLLOW: &str = "/api/follow";
    pub const UNFOLLOW: &str = "/api/unfollow";

    pub const POSTS: &str = "/api/posts";
    pub const CONVERSATIONS: &str = "/api/conversations";

    pub const STARTUP_SUBMIT: &str = "/api/startup/submit";
    pub const INVESTOR_REGISTER: &str = "/api/investor/register";

    pub fn post_like(post_id: &str) -> String {
        format!("/api/posts/{post_id}/like")
    }

    pub fn post_comment(post_id: &str) -> String {
        format!("/api/posts/{post_id}/comment")
    }

    pub fn post_bookmark(post_id: &str) -> String {
        format!("/api/posts/{post_id}/bookmark")
    }

    pub fn conversation_messages(conversation_id: &str) -> String {
        format!("/api/conversations/{conversation_id}/messages")
    }

    pub fn user(user_id: &str) -> String {
        format!("/api/users/{user_id}")
    }

    pub fn user_startups(user_id: &str) -> String {
        format!("/api/users/{user_id}/startups")
    }

    pub fn startup(startup_id: &str) -> String {
        format!("/api/startups/{startup_id}")
    }

    pub fn investor(investor_id: &str) -> String {
        format!("/api/investors/{investor_id}")
    }
}
