pub mod feed;
pub mod listing;
pub mod messages;

pub use feed::FeedStore;
pub use listing::{FeedSource, ListingStore};
pub use messages::{ChatPoller, MessagesStore};
