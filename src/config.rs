use std::time::Duration;

pub const DEFAULT_BASE_URL: &str =
    "https://ua.hdrezka.fm/f/cat=352/r-rating_kinopoisk=1;10/r-year=1925;2025/order_by=rating_kinopoisk/order=desc";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

pub const DEFAULT_TOTAL_PAGES: u32 = 10;

/// Options recognized by the scrape pipeline. Built once in main and passed
/// into the orchestrator; nothing reads global state.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Catalog base URL. Page 1 is fetched at `{base}/`, page n > 1 at
    /// `{base}/page/{n}/`.
    pub base_url: String,
    pub total_pages: u32,
    /// Per-fetch network timeout.
    pub timeout: Duration,
    pub user_agent: String,
    /// Inclusive `(from, to)` release-year filter, applied before any store
    /// access.
    pub year_range: Option<(i32, i32)>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            total_pages: DEFAULT_TOTAL_PAGES,
            timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            year_range: None,
        }
    }
}
