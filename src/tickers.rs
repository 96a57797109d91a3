//! Crypto ticker feed ingestion. One GET, one bulk upsert — unlike the
//! catalog pipeline there is no page loop and no per-field change detection:
//! every fetched row replaces its stored counterpart wholesale.

use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{info, warn};

use crate::db;

pub const DEFAULT_BASE_URL: &str = "https://api.coinlore.net/api";

const TICKERS_ENDPOINT: &str = "/tickers/";
/// The free tier caps responses at 100 tickers per request.
const FETCH_LIMIT: u32 = 100;

/// One ticker object as the feed delivers it. The feed sends most numeric
/// fields as strings; they are stored as-is since the whole row is replaced
/// on every ingest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ticker {
    pub id: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub nameid: Option<String>,
    pub rank: Option<i64>,
    pub price_usd: Option<String>,
    pub percent_change_1h: Option<String>,
    pub percent_change_24h: Option<String>,
    pub percent_change_7d: Option<String>,
    pub market_cap_usd: Option<String>,
    pub volume24: Option<f64>,
    pub volume24a: Option<f64>,
    pub csupply: Option<String>,
    pub tsupply: Option<String>,
    pub msupply: Option<String>,
}

/// JSON envelope around the ticker list.
#[derive(Debug, Deserialize)]
pub struct TickersResponse {
    pub data: Vec<Ticker>,
}

pub struct TickerFeed {
    client: reqwest::Client,
    base_url: String,
}

impl TickerFeed {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_tickers(&self, start: u32, limit: u32) -> Result<Vec<Ticker>> {
        let url = format!("{}{}", self.base_url, TICKERS_ENDPOINT);
        info!("Fetching tickers: {}?start={}&limit={}", url, start, limit);

        let envelope: TickersResponse = self
            .client
            .get(&url)
            .query(&[("start", start), ("limit", limit)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("request to {} failed", url))?
            .json()
            .await
            .context("failed to decode ticker envelope")?;

        Ok(envelope.data)
    }

    /// Fetch one batch and bulk-upsert it. Feed errors propagate; an empty
    /// batch is logged and saved as nothing.
    pub async fn fetch_and_save(&self, conn: &Connection) -> Result<usize> {
        let tickers = self.fetch_tickers(0, FETCH_LIMIT).await?;
        if tickers.is_empty() {
            warn!("Ticker feed returned no data");
            return Ok(0);
        }
        let saved = db::upsert_tickers(conn, &tickers)?;
        info!("Saved {} tickers", saved);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE: &str = r#"{
        "data": [
            {
                "id": "90", "symbol": "BTC", "name": "Bitcoin", "nameid": "bitcoin",
                "rank": 1, "price_usd": "6456.52", "percent_change_24h": "-1.47",
                "percent_change_1h": "0.05", "percent_change_7d": "-1.07",
                "market_cap_usd": "112045928572.53",
                "volume24": 4982566142.07, "volume24a": 4982566142.07,
                "csupply": "17353687.00", "tsupply": "17353687", "msupply": "21000000"
            },
            {
                "id": "80", "symbol": "ETH", "name": "Ethereum", "nameid": "ethereum",
                "rank": 2, "price_usd": "205.62"
            }
        ],
        "info": { "coins_num": 13906, "time": 1538560355 }
    }"#;

    #[test]
    fn envelope_deserializes_with_missing_fields() {
        let parsed: TickersResponse = serde_json::from_str(ENVELOPE).unwrap();
        assert_eq!(parsed.data.len(), 2);

        let btc = &parsed.data[0];
        assert_eq!(btc.id, "90");
        assert_eq!(btc.rank, Some(1));
        assert_eq!(btc.price_usd.as_deref(), Some("6456.52"));
        assert_eq!(btc.volume24, Some(4982566142.07));

        let eth = &parsed.data[1];
        assert_eq!(eth.volume24, None);
        assert_eq!(eth.msupply, None);
    }

    #[test]
    fn upsert_replaces_all_fields() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();

        let mut batch: Vec<Ticker> =
            serde_json::from_str::<TickersResponse>(ENVELOPE).unwrap().data;
        assert_eq!(db::upsert_tickers(&conn, &batch).unwrap(), 2);

        // Same ids again with a new price: still two rows, fields replaced.
        batch[0].price_usd = Some("7000.00".into());
        assert_eq!(db::upsert_tickers(&conn, &batch).unwrap(), 2);

        let stats = db::get_stats(&conn).unwrap();
        assert_eq!(stats.tickers, 2);

        let stored = db::fetch_all_tickers(&conn).unwrap();
        assert_eq!(stored.len(), 2);
        // Rank ordering: BTC (1) before ETH (2).
        assert_eq!(stored[0].price_usd.as_deref(), Some("7000.00"));
        assert_eq!(stored[0], batch[0]);
        assert_eq!(stored[1].symbol.as_deref(), Some("ETH"));
    }
}
