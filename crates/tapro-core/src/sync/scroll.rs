//! Scroll-proximity trigger for infinite scrolling.

/// Viewport measurements supplied by the rendering layer on each scroll
/// event and after each page append.
#[derive(Debug, Clone, Copy)]
pub struct ScrollGeometry {
    pub viewport_height: u32,
    pub scroll_offset: u32,
    pub content_height: u32,
}

/// True when the viewport bottom is within `threshold_px` of the end of
/// the content. Callers combine this with the pager's loading/has_more
/// guards; the guard, not a timer, is what debounces bursts of scroll
/// events.
pub fn should_fetch_more(geometry: ScrollGeometry, threshold_px: u32) -> bool {
    geometry.viewport_height + geometry.scroll_offset
        >= geometry.content_height.saturating_sub(threshold_px)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(viewport: u32, offset: u32, content: u32) -> ScrollGeometry {
        ScrollGeometry {
            viewport_height: viewport,
            scroll_offset: offset,
            content_height: content,
        }
    }

    #[test]
    fn test_triggers_near_bottom() {
        assert!(should_fetch_more(geometry(800, 1900, 3000), 300));
        assert!(should_fetch_more(geometry(800, 2200, 3000), 300));
    }

    #[test]
    fn test_quiet_far_from_bottom() {
        assert!(!should_fetch_more(geometry(800, 0, 3000), 300));
        assert!(!should_fetch_more(geometry(800, 1899, 3000), 300));
    }

    #[test]
    fn test_exact_threshold_boundary() {
        // viewport + offset == content - threshold triggers.
        assert!(should_fetch_more(geometry(800, 1900, 3000), 300));
    }

    #[test]
    fn test_short_content_always_triggers() {
        // Content shorter than the threshold: saturating subtraction, not underflow.
        assert!(should_fetch_more(geometry(800, 0, 200), 300));
    }
}
