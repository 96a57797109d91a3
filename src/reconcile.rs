//! Upsert-if-changed reconciliation of parsed records against the store.

use anyhow::Result;
use rusqlite::Connection;
use tracing::debug;

use crate::db::{self, Movie};
use crate::parser::ParsedRecord;

/// What the reconcile pass did for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    Updated,
    Unchanged,
}

/// Look up by (title, year) and insert, update genres, or leave untouched.
/// Re-running over unchanged source data issues zero writes. Store errors
/// propagate and abort the run.
pub fn reconcile(conn: &Connection, record: &ParsedRecord) -> Result<(Movie, Outcome)> {
    match db::find_by_title_year(conn, &record.title, record.year)? {
        None => {
            debug!("New movie: '{}' ({})", record.title, record.year);
            let movie = db::insert_movie(conn, record)?;
            Ok((movie, Outcome::Inserted))
        }
        Some(existing) if existing.genres == record.genres => {
            Ok((existing, Outcome::Unchanged))
        }
        Some(mut existing) => {
            debug!("Updating genres for '{}' ({})", record.title, record.year);
            db::update_genres(conn, existing.id, &record.genres)?;
            existing.genres = record.genres.clone();
            Ok((existing, Outcome::Updated))
        }
    }
}
