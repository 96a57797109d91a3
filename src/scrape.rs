//! Page fetching for the paginated catalog.

use anyhow::{Context, Result};
use scraper::Html;
use tracing::debug;

use crate::config::ScrapeConfig;

/// One page of the paginated source, addressed by 1-based index.
///
/// Seam for the pipeline: production code goes through [`PageFetcher`],
/// tests substitute canned documents and injected failures.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, page: u32) -> Result<Html>;
}

pub struct PageFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl PageFetcher {
    /// Build the HTTP client once. User agent and timeout are required
    /// configuration, not per-call options.
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Page 1 lives at the base URL itself; later pages get a path segment.
    fn page_url(&self, page: u32) -> String {
        if page > 1 {
            format!("{}/page/{}/", self.base_url, page)
        } else {
            format!("{}/", self.base_url)
        }
    }
}

impl PageSource for PageFetcher {
    /// GET one page and parse it. Network errors, timeouts and non-success
    /// statuses all surface as the `Err`; no retries here.
    async fn fetch_page(&self, page: u32) -> Result<Html> {
        let url = self.page_url(page);
        debug!("Fetching page {}: {}", page, url);

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("request to {} failed", url))?
            .text()
            .await
            .with_context(|| format!("failed to read body of {}", url))?;

        Ok(Html::parse_document(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(base: &str) -> PageFetcher {
        let config = ScrapeConfig {
            base_url: base.to_string(),
            ..ScrapeConfig::default()
        };
        PageFetcher::new(&config).unwrap()
    }

    #[test]
    fn first_page_is_base_url() {
        assert_eq!(fetcher("http://example.com/f").page_url(1), "http://example.com/f/");
    }

    #[test]
    fn later_pages_get_a_path_segment() {
        assert_eq!(
            fetcher("http://example.com/f").page_url(3),
            "http://example.com/f/page/3/"
        );
    }
}
