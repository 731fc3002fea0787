use std::time::Duration;

use crate::constants;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub api_base: String,
    pub page_size: usize,
    pub request_timeout: Duration,
    pub scroll_threshold_px: u32,
    pub chat_poll_interval: Duration,
}

impl CoreConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Self::default()
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_base: constants::DEFAULT_API_BASE.to_string(),
            page_size: constants::DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(constants::REQUEST_TIMEOUT_SECS),
            scroll_threshold_px: constants::SCROLL_THRESHOLD_PX,
            chat_poll_interval: Duration::from_secs(constants::CHAT_POLL_INTERVAL_SECS),
        }
    }
}
