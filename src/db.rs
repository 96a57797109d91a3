use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

use crate::parser::ParsedRecord;
use crate::tickers::Ticker;

pub const DB_PATH: &str = "data/movies.sqlite";

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS movies (
            id         INTEGER PRIMARY KEY,
            title      TEXT NOT NULL,
            year       INTEGER NOT NULL,
            genres     TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(title, year)
        );
        CREATE INDEX IF NOT EXISTS idx_movies_year ON movies(year);

        CREATE TABLE IF NOT EXISTS tickers (
            id                 TEXT PRIMARY KEY,
            symbol             TEXT,
            name               TEXT,
            nameid             TEXT,
            rank               INTEGER,
            price_usd          TEXT,
            percent_change_1h  TEXT,
            percent_change_24h TEXT,
            percent_change_7d  TEXT,
            market_cap_usd     TEXT,
            volume24           REAL,
            volume24a          REAL,
            csupply            TEXT,
            tsupply            TEXT,
            msupply            TEXT,
            fetched_at         TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

// ── Movies ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub year: i32,
    pub genres: String,
}

/// Natural-key lookup. The store deduplicates on (title, year); the rowid is
/// storage identity only.
pub fn find_by_title_year(conn: &Connection, title: &str, year: i32) -> Result<Option<Movie>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, year, genres FROM movies WHERE title = ?1 AND year = ?2",
    )?;
    let movie = stmt
        .query_row(params![title, year], |row| {
            Ok(Movie {
                id: row.get(0)?,
                title: row.get(1)?,
                year: row.get(2)?,
                genres: row.get(3)?,
            })
        })
        .optional()?;
    Ok(movie)
}

pub fn insert_movie(conn: &Connection, record: &ParsedRecord) -> Result<Movie> {
    conn.execute(
        "INSERT INTO movies (title, year, genres) VALUES (?1, ?2, ?3)",
        params![record.title, record.year, record.genres],
    )?;
    Ok(Movie {
        id: conn.last_insert_rowid(),
        title: record.title.clone(),
        year: record.year,
        genres: record.genres.clone(),
    })
}

/// Genres is the only mutable column; title and year never change after
/// insert.
pub fn update_genres(conn: &Connection, id: i64, genres: &str) -> Result<()> {
    conn.execute(
        "UPDATE movies SET genres = ?1 WHERE id = ?2",
        params![genres, id],
    )?;
    Ok(())
}

/// Read path for the `list` command: year descending, then title ascending.
pub fn fetch_by_year_range(conn: &Connection, year_from: i32, year_to: i32) -> Result<Vec<Movie>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, year, genres FROM movies
         WHERE year BETWEEN ?1 AND ?2
         ORDER BY year DESC, title ASC",
    )?;
    let rows = stmt
        .query_map(params![year_from, year_to], |row| {
            Ok(Movie {
                id: row.get(0)?,
                title: row.get(1)?,
                year: row.get(2)?,
                genres: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Tickers ──

/// Replace-all-fields bulk upsert keyed on the feed's own id. One
/// transaction for the whole batch; no per-field change detection.
pub fn upsert_tickers(conn: &Connection, tickers: &[Ticker]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO tickers
             (id, symbol, name, nameid, rank, price_usd, percent_change_1h,
              percent_change_24h, percent_change_7d, market_cap_usd,
              volume24, volume24a, csupply, tsupply, msupply)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
        )?;
        for t in tickers {
            count += stmt.execute(params![
                t.id,
                t.symbol,
                t.name,
                t.nameid,
                t.rank,
                t.price_usd,
                t.percent_change_1h,
                t.percent_change_24h,
                t.percent_change_7d,
                t.market_cap_usd,
                t.volume24,
                t.volume24a,
                t.csupply,
                t.tsupply,
                t.msupply,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

/// All stored tickers, best rank first; unranked rows sort last.
pub fn fetch_all_tickers(conn: &Connection) -> Result<Vec<Ticker>> {
    let mut stmt = conn.prepare(
        "SELECT id, symbol, name, nameid, rank, price_usd, percent_change_1h,
                percent_change_24h, percent_change_7d, market_cap_usd,
                volume24, volume24a, csupply, tsupply, msupply
         FROM tickers ORDER BY rank IS NULL, rank",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Ticker {
                id: row.get(0)?,
                symbol: row.get(1)?,
                name: row.get(2)?,
                nameid: row.get(3)?,
                rank: row.get(4)?,
                price_usd: row.get(5)?,
                percent_change_1h: row.get(6)?,
                percent_change_24h: row.get(7)?,
                percent_change_7d: row.get(8)?,
                market_cap_usd: row.get(9)?,
                volume24: row.get(10)?,
                volume24a: row.get(11)?,
                csupply: row.get(12)?,
                tsupply: row.get(13)?,
                msupply: row.get(14)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub movies: usize,
    pub tickers: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let movies: usize = conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
    let tickers: usize = conn.query_row("SELECT COUNT(*) FROM tickers", [], |r| r.get(0))?;
    Ok(Stats { movies, tickers })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn record(title: &str, year: i32, genres: &str) -> ParsedRecord {
        ParsedRecord {
            title: title.to_string(),
            year,
            genres: genres.to_string(),
        }
    }

    #[test]
    fn insert_then_find_by_natural_key() {
        let conn = mem_conn();
        let inserted = insert_movie(&conn, &record("Solaris", 1972, "Drama, Sci-Fi")).unwrap();
        assert!(inserted.id > 0);

        let found = find_by_title_year(&conn, "Solaris", 1972).unwrap().unwrap();
        assert_eq!(found, inserted);
        assert!(find_by_title_year(&conn, "Solaris", 2002).unwrap().is_none());
    }

    #[test]
    fn same_title_different_year_coexist() {
        let conn = mem_conn();
        insert_movie(&conn, &record("Solaris", 1972, "Drama")).unwrap();
        insert_movie(&conn, &record("Solaris", 2002, "Sci-Fi")).unwrap();
        assert_eq!(fetch_by_year_range(&conn, 1900, 2100).unwrap().len(), 2);
    }

    #[test]
    fn update_touches_only_genres() {
        let conn = mem_conn();
        let m = insert_movie(&conn, &record("Alien", 1979, "Horror")).unwrap();
        update_genres(&conn, m.id, "Horror, Sci-Fi").unwrap();

        let updated = find_by_title_year(&conn, "Alien", 1979).unwrap().unwrap();
        assert_eq!(updated.id, m.id);
        assert_eq!(updated.title, "Alien");
        assert_eq!(updated.year, 1979);
        assert_eq!(updated.genres, "Horror, Sci-Fi");
    }

    #[test]
    fn range_query_orders_year_desc_title_asc() {
        let conn = mem_conn();
        insert_movie(&conn, &record("Brazil", 1985, "Satire")).unwrap();
        insert_movie(&conn, &record("Akira", 1988, "Anime")).unwrap();
        insert_movie(&conn, &record("Aliens", 1986, "Action")).unwrap();
        insert_movie(&conn, &record("Platoon", 1986, "War")).unwrap();

        let titles: Vec<String> = fetch_by_year_range(&conn, 1980, 1990)
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["Akira", "Aliens", "Platoon", "Brazil"]);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let conn = mem_conn();
        insert_movie(&conn, &record("A", 2000, "x")).unwrap();
        insert_movie(&conn, &record("B", 2010, "x")).unwrap();
        insert_movie(&conn, &record("C", 1999, "x")).unwrap();
        assert_eq!(fetch_by_year_range(&conn, 2000, 2010).unwrap().len(), 2);
    }
}
