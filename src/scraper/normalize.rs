//! Derived fields for scraped races: region code and month.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{RawRace, RaceRecord};

/// Place names mapped to region codes, scanned in order.
///
/// Lookup is substring containment and the first hit wins, so a location
/// naming several places takes the code of whichever appears first here.
pub const REGION_TABLE: [(&str, u8); 24] = [
    // 1: north
    ("台北", 1),
    ("臺北", 1),
    ("新北", 1),
    ("基隆", 1),
    ("桃園", 1),
    ("新竹", 1),
    ("宜蘭", 1),
    // 2: central
    ("台中", 2),
    ("臺中", 2),
    ("苗栗", 2),
    ("彰化", 2),
    ("南投", 2),
    ("雲林", 2),
    // 3: south
    ("高雄", 3),
    ("台南", 3),
    ("臺南", 3),
    ("嘉義", 3),
    ("屏東", 3),
    // 4: east
    ("花蓮", 4),
    ("台東", 4),
    ("臺東", 4),
    // 5: outlying islands
    ("金門", 5),
    ("澎湖", 5),
    ("馬祖", 5),
];

/// Region code for an unrecognized location
pub const UNKNOWN_REGION: u8 = 0;

static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})/\d{2}").expect("month pattern is valid"));

/// Region code of the first table entry contained in `location`
pub fn region_code(location: &str) -> u8 {
    REGION_TABLE
        .iter()
        .find(|(place, _)| location.contains(place))
        .map(|&(_, code)| code)
        .unwrap_or(UNKNOWN_REGION)
}

/// Two-digit month from the first `MM/DD` found in `date`
pub fn extract_month(date: &str) -> Option<String> {
    MONTH_RE
        .captures(date)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Add region code and month to every scraped race
pub fn normalize(races: Vec<RawRace>) -> Vec<RaceRecord> {
    races.into_iter().map(normalize_one).collect()
}

fn normalize_one(raw: RawRace) -> RaceRecord {
    let region_code = region_code(&raw.location);
    let month = extract_month(&raw.date);

    RaceRecord {
        date: raw.date,
        name: raw.name,
        location: raw.location,
        distance: raw.distance,
        link: raw.link,
        registration_date: raw.registration_date,
        region_code,
        month,
    }
}
