//! Race calendar (contest.aspx) parser.
//!
//! Each race is a `tr.rowbackgroundcolor` row with cells:
//! 1 = name (optionally linked), 3 = date, 4 = location, 5 = distance,
//! 7 = registration period (not present on every row).

use scraper::{ElementRef, Html, Selector};

use crate::scraper::ScrapeError;
use crate::types::{RawRace, NO_DATA};

/// Rows with fewer cells than this are layout rows, not races
const MIN_CELLS: usize = 7;

const NAME_CELL: usize = 1;
const DATE_CELL: usize = 3;
const LOCATION_CELL: usize = 4;
const DISTANCE_CELL: usize = 5;
const REGISTRATION_CELL: usize = 7;

/// Parser for the race calendar table
pub struct ContestParser;

impl ContestParser {
    /// Parse every race row on the page.
    ///
    /// Short rows are skipped. A selector failure aborts the whole parse so
    /// callers never see a partial table.
    pub fn parse(html: &str) -> Result<Vec<RawRace>, ScrapeError> {
        let document = Html::parse_document(html);

        let row_selector = selector("tr.rowbackgroundcolor")?;
        let cell_selector = selector("td")?;
        let link_selector = selector("a")?;

        let mut races = Vec::new();

        for row in document.select(&row_selector) {
            let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
            if cells.len() < MIN_CELLS {
                continue;
            }

            let name_cell = cells[NAME_CELL];
            let (name, link) = match name_cell.select(&link_selector).next() {
                Some(anchor) => (
                    cell_text(&anchor),
                    anchor
                        .value()
                        .attr("href")
                        .unwrap_or(NO_DATA)
                        .to_string(),
                ),
                None => (cell_text(&name_cell), NO_DATA.to_string()),
            };

            let registration_date = cells
                .get(REGISTRATION_CELL)
                .map(cell_text)
                .unwrap_or_else(|| NO_DATA.to_string());

            races.push(RawRace {
                date: cell_text(&cells[DATE_CELL]),
                name,
                location: cell_text(&cells[LOCATION_CELL]),
                distance: cell_text(&cells[DISTANCE_CELL]),
                link,
                registration_date,
            });
        }

        Ok(races)
    }
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Parse(format!("selector {:?}: {}", css, e)))
}

fn cell_text(elem: &ElementRef) -> String {
    elem.text().collect::<String>().trim().to_string()
}
