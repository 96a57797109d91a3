//! The scrape → extract → parse → reconcile loop.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::{error, info, warn};

use crate::config::ScrapeConfig;
use crate::db::Movie;
use crate::parser::{self, ItemSelectors};
use crate::reconcile::{self, Outcome};
use crate::scrape::PageSource;

/// Counters for one run. `items_parsed` is exactly the number of records
/// that reached reconciliation, so `inserted + updated + unchanged ==
/// items_parsed` always holds.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub items_parsed: usize,
    /// Items lost to missing sub-nodes, absent year tokens, empty genres,
    /// or the year-range filter.
    pub items_skipped: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl RunSummary {
    pub fn print(&self) {
        println!(
            "Pages:  {} fetched, {} failed",
            self.pages_fetched, self.pages_failed
        );
        println!(
            "Items:  {} parsed, {} skipped",
            self.items_parsed, self.items_skipped
        );
        println!(
            "Store:  {} inserted, {} updated, {} unchanged",
            self.inserted, self.updated, self.unchanged
        );
    }
}

pub struct RunReport {
    /// Every reconciled movie in page-then-in-page encounter order,
    /// whatever the outcome. Display ordering is the store's concern.
    pub movies: Vec<Movie>,
    pub summary: RunSummary,
}

/// Run the pipeline with the catalog's default selectors.
pub async fn run(
    source: &impl PageSource,
    conn: &Connection,
    config: &ScrapeConfig,
) -> Result<RunReport> {
    run_with_selectors(source, conn, config, &ItemSelectors::default()).await
}

/// Pages are fetched strictly in order, 1..=total. A failed page is logged,
/// counted and skipped whole; a bad item is logged, counted and skipped;
/// only store errors abort the run.
pub async fn run_with_selectors(
    source: &impl PageSource,
    conn: &Connection,
    config: &ScrapeConfig,
    selectors: &ItemSelectors,
) -> Result<RunReport> {
    info!(
        "Scraping {} pages from {}",
        config.total_pages, config.base_url
    );

    let pb = ProgressBar::new(config.total_pages as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages")?
            .progress_chars("=> "),
    );

    let mut movies = Vec::new();
    let mut summary = RunSummary::default();

    for page in 1..=config.total_pages {
        let doc = match source.fetch_page(page).await {
            Ok(doc) => doc,
            Err(e) => {
                error!("Failed to fetch page {}: {:#}", page, e);
                summary.pages_failed += 1;
                pb.inc(1);
                continue;
            }
        };
        summary.pages_fetched += 1;

        let extraction = selectors.extract(&doc);
        info!(
            "Found {} items on page {}",
            extraction.candidates.len(),
            page
        );
        summary.items_skipped += extraction.skipped;

        for candidate in &extraction.candidates {
            let Some(record) = parser::parse_candidate(candidate) else {
                warn!(
                    "No year token in info line for '{}' on page {}, skipping",
                    candidate.title, page
                );
                summary.items_skipped += 1;
                continue;
            };

            if record.genres.is_empty() {
                warn!(
                    "Empty genres for '{}' ({}), skipping",
                    record.title, record.year
                );
                summary.items_skipped += 1;
                continue;
            }

            // Range filter runs before reconciliation: filtered-out years
            // never touch the store.
            if let Some((from, to)) = config.year_range {
                if record.year < from || record.year > to {
                    summary.items_skipped += 1;
                    continue;
                }
            }

            summary.items_parsed += 1;
            let (movie, outcome) = reconcile::reconcile(conn, &record)?;
            match outcome {
                Outcome::Inserted => summary.inserted += 1,
                Outcome::Updated => summary.updated += 1,
                Outcome::Unchanged => summary.unchanged += 1,
            }
            movies.push(movie);
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Scrape finished: {} movies reconciled ({} inserted, {} updated, {} unchanged)",
        movies.len(),
        summary.inserted,
        summary.updated,
        summary.unchanged
    );

    Ok(RunReport { movies, summary })
}
