mod config;
mod db;
mod parser;
mod pipeline;
mod reconcile;
mod scrape;
mod tickers;

use std::time::{Duration, Instant};

use chrono::Datelike;
use clap::{Parser, Subcommand};

use crate::config::ScrapeConfig;
use crate::scrape::PageFetcher;
use crate::tickers::TickerFeed;

const MIN_YEAR: i32 = 1925;
const DEFAULT_LIST_FROM: i32 = 1990;

#[derive(Parser)]
#[command(name = "rezka_scraper", about = "Movie catalog scraper with upsert-if-changed reconciliation")]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, default_value = db::DB_PATH)]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape catalog pages and reconcile movies into the store
    Scrape {
        /// Number of catalog pages to fetch
        #[arg(short = 'n', long, default_value_t = config::DEFAULT_TOTAL_PAGES)]
        pages: u32,
        /// Keep only movies released in or after this year
        #[arg(long)]
        year_from: Option<i32>,
        /// Keep only movies released in or before this year
        #[arg(long)]
        year_to: Option<i32>,
        /// Catalog base URL
        #[arg(long)]
        base_url: Option<String>,
    },
    /// List stored movies for a year range
    List {
        #[arg(long)]
        year_from: Option<i32>,
        #[arg(long)]
        year_to: Option<i32>,
    },
    /// Fetch the crypto ticker feed and bulk-upsert it
    Tickers {
        /// Ticker feed base URL
        #[arg(long, default_value = tickers::DEFAULT_BASE_URL)]
        base_url: String,
    },
    /// List stored tickers by rank
    ListTickers {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Show store statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scrape { pages, year_from, year_to, base_url } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;

            let mut cfg = ScrapeConfig {
                total_pages: pages,
                ..ScrapeConfig::default()
            };
            if let Some(url) = base_url {
                cfg.base_url = url;
            }
            cfg.year_range = year_range(year_from, year_to)?;

            let fetcher = PageFetcher::new(&cfg)?;
            let report = pipeline::run(&fetcher, &conn, &cfg).await?;
            println!("Reconciled {} movies.", report.movies.len());
            report.summary.print();
            Ok(())
        }
        Commands::List { year_from, year_to } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;

            let from = year_from.unwrap_or(DEFAULT_LIST_FROM);
            let to = year_to.unwrap_or_else(current_year);
            if from > to {
                anyhow::bail!("--year-from {} exceeds --year-to {}", from, to);
            }

            let movies = db::fetch_by_year_range(&conn, from, to)?;
            if movies.is_empty() {
                println!("No movies stored for {}..{}. Run 'scrape' first.", from, to);
                return Ok(());
            }

            println!("{:>3} | {:<44} | {:>4} | {}", "#", "Title", "Year", "Genres");
            println!("{}", "-".repeat(90));
            for (i, m) in movies.iter().enumerate() {
                println!(
                    "{:>3} | {:<44} | {:>4} | {}",
                    i + 1,
                    truncate(&m.title, 44),
                    m.year,
                    m.genres
                );
            }
            println!("\n{} movies", movies.len());
            Ok(())
        }
        Commands::Tickers { base_url } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;

            let feed = TickerFeed::new(&base_url, Duration::from_secs(20))?;
            let saved = feed.fetch_and_save(&conn).await?;
            println!("Saved {} tickers.", saved);
            Ok(())
        }
        Commands::ListTickers { limit } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;

            let all = db::fetch_all_tickers(&conn)?;
            if all.is_empty() {
                println!("No tickers stored. Run 'tickers' first.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<8} | {:<24} | {:>16} | {:>8}",
                "Rank", "Symbol", "Name", "Price USD", "24h %"
            );
            println!("{}", "-".repeat(74));
            for t in all.iter().take(limit) {
                println!(
                    "{:>4} | {:<8} | {:<24} | {:>16} | {:>8}",
                    t.rank.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
                    t.symbol.as_deref().unwrap_or("-"),
                    truncate(t.name.as_deref().unwrap_or("-"), 24),
                    t.price_usd.as_deref().unwrap_or("-"),
                    t.percent_change_24h.as_deref().unwrap_or("-"),
                );
            }
            println!("\n{} tickers", all.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;

            let s = db::get_stats(&conn)?;
            println!("Movies:  {}", s.movies);
            println!("Tickers: {}", s.tickers);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Fold the optional CLI bounds into a filter range. A single bound gets the
/// catalog's floor or the current year as the other end.
fn year_range(from: Option<i32>, to: Option<i32>) -> anyhow::Result<Option<(i32, i32)>> {
    let range = match (from, to) {
        (None, None) => None,
        (from, to) => {
            let from = from.unwrap_or(MIN_YEAR);
            let to = to.unwrap_or_else(current_year);
            if from > to {
                anyhow::bail!("--year-from {} exceeds --year-to {}", from, to);
            }
            Some((from, to))
        }
    };
    Ok(range)
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_requires_ordered_bounds() {
        assert!(year_range(Some(2010), Some(2000)).is_err());
        assert_eq!(year_range(Some(2000), Some(2010)).unwrap(), Some((2000, 2010)));
        assert_eq!(year_range(None, None).unwrap(), None);
    }

    #[test]
    fn single_bound_gets_a_default_other_end() {
        let (from, to) = year_range(Some(2000), None).unwrap().unwrap();
        assert_eq!(from, 2000);
        assert!(to >= 2025);

        let (from, to) = year_range(None, Some(2010)).unwrap().unwrap();
        assert_eq!(from, MIN_YEAR);
        assert_eq!(to, 2010);
    }

    #[test]
    fn truncate_keeps_short_strings_intact() {
        assert_eq!(truncate("Alien", 10), "Alien");
        assert_eq!(truncate("A Very Long Movie Title", 10), "A Very Lon...");
    }
}
