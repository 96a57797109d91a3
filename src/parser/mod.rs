pub mod extract;
pub mod fields;

pub use extract::{Extraction, ItemSelectors, RawCandidate};

/// Record parsed out of a raw candidate. Deduplication downstream is keyed
/// by (title, year).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub title: String,
    pub year: i32,
    pub genres: String,
}

/// Candidate → record. A candidate survives only if its info line carries a
/// 4-digit year token; everything after that token becomes the genres string.
pub fn parse_candidate(candidate: &RawCandidate) -> Option<ParsedRecord> {
    let year = fields::parse_year(&candidate.info)?;
    let genres = fields::parse_genres(&candidate.info)?;
    Some(ParsedRecord {
        title: candidate.title.clone(),
        year,
        genres,
    })
}
