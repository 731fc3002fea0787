pub mod filter;
pub mod merge;
pub mod pager;
pub mod scroll;
pub mod toggle;

pub use filter::{filter_items, matches_query, FilterState};
pub use merge::append_page;
pub use pager::{FetchOutcome, Pager, PagerState};
pub use scroll::{should_fetch_more, ScrollGeometry};
pub use toggle::{ToggleOutcome, ToggleTracker};
