//! Race calendar scraper for taipeimarathon.org.tw
//!
//! Fetches the contest listing, parses its table rows and derives
//! region/month fields for querying.

pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod parsers;
pub mod pipeline;

pub use error::ScrapeError;
pub use pipeline::{RaceSource, ScrapePipeline};

/// Race calendar page
pub const CONTEST_URL: &str = "http://www.taipeimarathon.org.tw/contest.aspx";

/// Desktop browser user agent sent with every fetch
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
