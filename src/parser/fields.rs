//! Field parsing for the loosely formatted info line, e.g.
//! `"2015, Action, Drama"` or `"Драма, 2019, Україна"`.

use std::sync::LazyLock;

use regex::Regex;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

/// First standalone 4-digit token in the info line, as the release year.
pub fn parse_year(info: &str) -> Option<i32> {
    let m = YEAR_RE.find(info)?;
    m.as_str().parse::<i32>().ok()
}

/// Text following the year token, with one leading comma stripped.
/// `None` when the line has no year token at all.
pub fn parse_genres(info: &str) -> Option<String> {
    let m = YEAR_RE.find(info)?;
    let rest = info[m.end()..].trim();
    let rest = match rest.strip_prefix(',') {
        Some(after_comma) => after_comma.trim_start(),
        None => rest,
    };
    Some(rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_then_genres() {
        let info = "2015, Action, Drama";
        assert_eq!(parse_year(info), Some(2015));
        assert_eq!(parse_genres(info).as_deref(), Some("Action, Drama"));
    }

    #[test]
    fn no_year_token() {
        let info = "Action, Drama";
        assert_eq!(parse_year(info), None);
        assert_eq!(parse_genres(info), None);
    }

    #[test]
    fn year_at_end_leaves_empty_genres() {
        let info = "Action, Drama, 2015";
        assert_eq!(parse_year(info), Some(2015));
        assert_eq!(parse_genres(info).as_deref(), Some(""));
    }

    #[test]
    fn longer_digit_runs_are_not_years() {
        assert_eq!(parse_year("12345, Action"), None);
        assert_eq!(parse_year("id 987654321"), None);
    }

    #[test]
    fn first_of_several_tokens_wins() {
        let info = "1999, remastered 2021, Sci-Fi";
        assert_eq!(parse_year(info), Some(1999));
        assert_eq!(parse_genres(info).as_deref(), Some("remastered 2021, Sci-Fi"));
    }

    #[test]
    fn no_comma_after_year() {
        let info = "2003 Comedy";
        assert_eq!(parse_year(info), Some(2003));
        assert_eq!(parse_genres(info).as_deref(), Some("Comedy"));
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_genres(""), None);
    }
}
