//! Race search and reply formatting.

use std::fmt::Write;
use std::str::FromStr;
use thiserror::Error;
use tracing::error;

use crate::store::Snapshot;
use crate::types::RaceRecord;

pub const NO_DATA_AVAILABLE: &str = "目前沒有可用的賽事資料";
pub const INVALID_SEARCH_TYPE: &str = "無效的搜尋類型";
pub const SEARCH_FAILED: &str = "搜尋過程發生錯誤，請稍後再試";
pub const NO_MATCH: &str = "找不到符合的賽事";
const RESULTS_HEADER: &str = "找到以下賽事：\n\n";

/// How the search value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Trailing two characters are a month ("202506" → "06")
    Date,
    /// Region code 0-5
    Region,
    /// Case-insensitive substring of name or location
    Keyword,
}

impl FromStr for SearchMode {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SearchMode::Date),
            "region" => Ok(SearchMode::Region),
            "keyword" => Ok(SearchMode::Keyword),
            other => Err(QueryError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown search type: {0:?}")]
    UnknownMode(String),

    #[error("region code is not a number: {0:?}")]
    InvalidRegion(String),
}

/// Search the snapshot and build the reply text. Never fails.
pub fn search(snapshot: Option<&Snapshot>, mode: &str, value: &str) -> String {
    let Some(snapshot) = snapshot.filter(|s| !s.is_empty()) else {
        return NO_DATA_AVAILABLE.to_string();
    };

    let mode = match mode.parse::<SearchMode>() {
        Ok(mode) => mode,
        Err(_) => return INVALID_SEARCH_TYPE.to_string(),
    };

    match filter(snapshot, mode, value) {
        Ok(results) => format_response(&results),
        Err(e) => {
            error!("Search failed ({:?}, {:?}): {}", mode, value, e);
            SEARCH_FAILED.to_string()
        }
    }
}

/// Records matching `value` under `mode`
pub fn filter<'a>(
    snapshot: &'a Snapshot,
    mode: SearchMode,
    value: &str,
) -> Result<Vec<&'a RaceRecord>, QueryError> {
    let races = snapshot.races.iter();

    let results = match mode {
        SearchMode::Date => {
            let month = trailing_chars(value, 2);
            races
                .filter(|r| r.month.as_deref() == Some(month))
                .collect()
        }
        SearchMode::Region => {
            let code: i64 = value
                .trim()
                .parse()
                .map_err(|_| QueryError::InvalidRegion(value.to_string()))?;
            races.filter(|r| i64::from(r.region_code) == code).collect()
        }
        SearchMode::Keyword => {
            let needle = value.to_lowercase();
            races
                .filter(|r| {
                    contains_ignore_case(&r.name, &needle)
                        || contains_ignore_case(&r.location, &needle)
                })
                .collect()
        }
    };

    Ok(results)
}

/// Last `n` characters of `s`, or all of it when shorter
fn trailing_chars(s: &str, n: usize) -> &str {
    match s.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    !haystack.is_empty() && haystack.to_lowercase().contains(lowered_needle)
}

/// Multi-line reply listing every record
pub fn format_response(results: &[&RaceRecord]) -> String {
    if results.is_empty() {
        return NO_MATCH.to_string();
    }

    let mut response = String::from(RESULTS_HEADER);
    for race in results {
        // Writing to a String cannot fail
        let _ = writeln!(response, "📅 {}", race.date);
        let _ = writeln!(response, "🏃 {}", race.name);
        let _ = writeln!(response, "📍 {}", race.location);
        let _ = writeln!(response, "🏃‍♂️ {}", race.distance);
        if race.has_link() {
            let _ = writeln!(response, "🔗 {}", race.link);
        }
        if race.has_registration_date() {
            let _ = writeln!(response, "⏰ {}", race.registration_date);
        }
        response.push('\n');
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::normalize::normalize;
    use crate::types::{RawRace, NO_DATA};

    fn raw(name: &str, date: &str, location: &str) -> RawRace {
        RawRace {
            date: date.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            distance: "21K".to_string(),
            link: NO_DATA.to_string(),
            registration_date: NO_DATA.to_string(),
        }
    }

    fn sample_snapshot() -> Snapshot {
        Snapshot::new(normalize(vec![
            raw("高雄國際半馬", "06/08", "高雄市"),
            raw("臺北城市路跑", "06/22", "台北市"),
            raw("Taroko Marathon", "11/09", "花蓮縣"),
            raw("金門馬拉松", "02/02", "金門縣"),
            raw("待定賽事", "未公布", ""),
        ]))
    }

    fn names(results: &[&RaceRecord]) -> Vec<String> {
        results.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_date_mode_uses_trailing_month() {
        let snapshot = sample_snapshot();
        let results = filter(&snapshot, SearchMode::Date, "202506").unwrap();

        assert_eq!(names(&results), vec!["高雄國際半馬", "臺北城市路跑"]);
    }

    #[test]
    fn test_date_mode_ignores_year() {
        let snapshot = sample_snapshot();
        let results = filter(&snapshot, SearchMode::Date, "999911").unwrap();

        assert_eq!(names(&results), vec!["Taroko Marathon"]);
    }

    #[test]
    fn test_region_mode_exact_code() {
        let snapshot = sample_snapshot();
        let results = filter(&snapshot, SearchMode::Region, "3").unwrap();

        assert_eq!(names(&results), vec!["高雄國際半馬"]);
    }

    #[test]
    fn test_region_mode_zero_matches_unrecognized() {
        let snapshot = sample_snapshot();
        let results = filter(&snapshot, SearchMode::Region, "0").unwrap();

        assert_eq!(names(&results), vec!["待定賽事"]);
    }

    #[test]
    fn test_region_mode_rejects_non_numeric() {
        let snapshot = sample_snapshot();
        let err = filter(&snapshot, SearchMode::Region, "abc").unwrap_err();

        assert_eq!(err, QueryError::InvalidRegion("abc".to_string()));
        assert_eq!(search(Some(&snapshot), "region", "abc"), SEARCH_FAILED);
    }

    #[test]
    fn test_keyword_mode_matches_name_or_location() {
        let snapshot = sample_snapshot();

        let by_name = filter(&snapshot, SearchMode::Keyword, "半馬").unwrap();
        assert_eq!(names(&by_name), vec!["高雄國際半馬"]);

        let by_location = filter(&snapshot, SearchMode::Keyword, "花蓮").unwrap();
        assert_eq!(names(&by_location), vec!["Taroko Marathon"]);
    }

    #[test]
    fn test_keyword_mode_is_case_insensitive() {
        let snapshot = sample_snapshot();
        let results = filter(&snapshot, SearchMode::Keyword, "tAROKO").unwrap();

        assert_eq!(names(&results), vec!["Taroko Marathon"]);
    }

    #[test]
    fn test_no_snapshot_returns_no_data_for_every_mode() {
        let empty = Snapshot::new(Vec::new());
        for mode in ["date", "region", "keyword", "bogus"] {
            assert_eq!(search(None, mode, "202506"), NO_DATA_AVAILABLE);
            assert_eq!(search(Some(&empty), mode, "3"), NO_DATA_AVAILABLE);
        }
    }

    #[test]
    fn test_unknown_mode() {
        let snapshot = sample_snapshot();
        assert_eq!(search(Some(&snapshot), "distance", "42"), INVALID_SEARCH_TYPE);
    }

    #[test]
    fn test_no_match_message() {
        let snapshot = sample_snapshot();
        assert_eq!(search(Some(&snapshot), "keyword", "超級馬拉松"), NO_MATCH);
    }

    #[test]
    fn test_format_response_skips_sentinel_fields() {
        let snapshot = sample_snapshot();
        let reply = search(Some(&snapshot), "region", "5");

        assert_eq!(
            reply,
            "找到以下賽事：\n\n📅 02/02\n🏃 金門馬拉松\n📍 金門縣\n🏃‍♂️ 21K\n\n"
        );
    }

    #[test]
    fn test_format_response_includes_link_and_registration() {
        let record = RaceRecord {
            date: "12/15".to_string(),
            name: "臺北馬拉松".to_string(),
            location: "臺北市".to_string(),
            distance: "42.195K".to_string(),
            link: "https://example.com".to_string(),
            registration_date: "08/01~09/30".to_string(),
            region_code: 1,
            month: Some("12".to_string()),
        };
        let reply = format_response(&[&record]);

        assert!(reply.contains("🔗 https://example.com\n"));
        assert!(reply.contains("⏰ 08/01~09/30\n"));
        assert!(reply.ends_with("\n\n"));
    }

    #[test]
    fn test_trailing_chars() {
        assert_eq!(trailing_chars("202506", 2), "06");
        assert_eq!(trailing_chars("6", 2), "6");
        assert_eq!(trailing_chars("", 2), "");
        assert_eq!(trailing_chars("二〇二五年六月", 2), "六月");
    }

    #[test]
    fn test_search_mode_from_str() {
        assert_eq!("date".parse::<SearchMode>(), Ok(SearchMode::Date));
        assert_eq!("keyword".parse::<SearchMode>(), Ok(SearchMode::Keyword));
        assert!("Date".parse::<SearchMode>().is_err());
    }
}
