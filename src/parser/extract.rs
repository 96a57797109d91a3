//! Candidate extraction from a fetched catalog page.

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Unparsed record pulled from one item node, prior to field parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub title: String,
    pub info: String,
}

/// Result of running the selectors over one page.
#[derive(Debug, Default)]
pub struct Extraction {
    pub candidates: Vec<RawCandidate>,
    /// Item nodes that were missing a title or info sub-node.
    pub skipped: usize,
}

/// Compiled selector set for one source shape. Swap the three CSS strings to
/// point the extractor at a differently structured catalog without touching
/// the pipeline.
pub struct ItemSelectors {
    item: Selector,
    title: Selector,
    info: Selector,
}

impl ItemSelectors {
    pub fn new(item: &str, title: &str, info: &str) -> Result<Self> {
        Ok(Self {
            item: parse_selector(item)?,
            title: parse_selector(title)?,
            info: parse_selector(info)?,
        })
    }

    /// Select all item nodes and pull title + info text out of each. A node
    /// missing either sub-node is counted and skipped; never fatal to the
    /// page.
    pub fn extract(&self, doc: &Html) -> Extraction {
        let mut extraction = Extraction::default();

        for item in doc.select(&self.item) {
            let title = item.select(&self.title).next().map(text_of);
            let info = item.select(&self.info).next().map(text_of);

            match (title, info) {
                (Some(title), Some(info)) if !title.is_empty() => {
                    extraction.candidates.push(RawCandidate { title, info });
                }
                _ => {
                    warn!("Item node missing title or info sub-node, skipping");
                    extraction.skipped += 1;
                }
            }
        }

        extraction
    }
}

impl Default for ItemSelectors {
    /// Selectors for the movie catalog's result-page markup.
    fn default() -> Self {
        Self::new("div.postItem", "div.postitem-title a", "span.misc")
            .expect("default selectors are valid")
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector '{}': {}", css, e))
}

/// Concatenated text content of a node, whitespace-collapsed.
fn text_of(el: ElementRef) -> String {
    el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
