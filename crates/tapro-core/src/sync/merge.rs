//! Page merging with identity-based deduplication.

use std::collections::HashSet;

use crate::models::ListItem;

/// Append `new_items` to `existing`, dropping any whose id is already
/// present. Arrival order is preserved and the operation is idempotent:
/// replaying an already-merged page is a no-op. O(existing + new).
pub fn append_page(mut existing: Vec<ListItem>, new_items: Vec<ListItem>) -> Vec<ListItem> {
    let mut seen: HashSet<String> = existing.iter().map(|item| item.id.clone()).collect();
    for item in new_items {
        if seen.insert(item.id.clone()) {
            existing.push(item);
        }
    }
    existing
}
