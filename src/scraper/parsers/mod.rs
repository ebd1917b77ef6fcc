//! HTML parsers for the race calendar site.

pub mod contest;

pub use contest::ContestParser;
