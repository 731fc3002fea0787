pub mod conversation;
pub mod listing;
pub mod post;

pub use conversation::{ChatMessage, Conversation};
pub use listing::{Category, ListItem, Page};
pub use post::{Comment, NewPost, Post, PostAuthor, PostKind};
