//! Parsing of scraped tracking pages into flight details

use super::FlightInfo;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Numeric token: digit run with an optional thousands separator, so
/// "1,174" is one token rather than two.
static NUMERIC_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d*,?\d+").expect("Invalid NUMERIC_TOKEN_REGEX pattern"));

const DURATION_PANEL: &str = ".track-panel-duration";
const DEPARTURE_PANEL: &str = ".track-panel-departure";
const ARRIVAL_PANEL: &str = ".track-panel-arrival";
const SECONDARY_HEADER: &str = ".secondaryHeader";
const DETAIL_CELL: &str = ".smallrow2";

/// The first two numeric tokens found in a page cell.
///
/// Tracking pages render durations as "2h 30m" (two tokens) or "45m"
/// (one) and distances as "Planned: 1,300 mi Direct: 1,174 mi" (two) or a
/// single figure. Cells never carry more than two meaningful tokens, so
/// anything past the second is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericCapture {
    /// No numeric token at all. For the duration cell this marks the
    /// "flight not found" page.
    None,
    One(u64),
    Two(u64, u64),
}

/// Tokenize `text` into at most two numbers, separators stripped.
#[must_use]
pub fn capture(text: &str) -> NumericCapture {
    let mut nums = NUMERIC_TOKEN_REGEX
        .find_iter(text)
        .filter_map(|m| m.as_str().replace(',', "").parse::<u64>().ok());

    match (nums.next(), nums.next()) {
        (None, _) => NumericCapture::None,
        (Some(first), None) => NumericCapture::One(first),
        (Some(first), Some(second)) => NumericCapture::Two(first, second),
    }
}

/// Interpret a duration capture as minutes: two tokens are hours and
/// minutes, one token is already minutes.
#[must_use]
pub fn duration_minutes(capture: NumericCapture) -> u64 {
    match capture {
        NumericCapture::None => 0,
        NumericCapture::One(minutes) => minutes,
        NumericCapture::Two(hours, minutes) => hours * 60 + minutes,
    }
}

/// Interpret a distance capture as miles. When both a planned and a
/// direct figure are present the second one wins.
#[must_use]
pub fn distance_miles(capture: NumericCapture) -> Option<u64> {
    match capture {
        NumericCapture::None => None,
        NumericCapture::One(miles) => Some(miles),
        NumericCapture::Two(_, miles) => Some(miles),
    }
}

/// Parse a fetched tracking page into a [`FlightInfo`].
///
/// Returns `None` when the duration cell has no numeric content, which is
/// how the tracking site renders an unknown or retired flight code. A
/// missing distance row is not an error; the flight is kept with an
/// unknown distance.
#[must_use]
pub fn parse_tracking_page(html: &str) -> Option<FlightInfo> {
    let document = Html::parse_document(html);

    let duration = capture(&select_text(&document, DURATION_PANEL));
    if duration == NumericCapture::None {
        return None;
    }

    let distance = capture(&distance_cell_text(&document));

    Some(FlightInfo {
        from: collapse_whitespace(&select_text(&document, DEPARTURE_PANEL)),
        to: collapse_whitespace(&select_text(&document, ARRIVAL_PANEL)),
        distance_miles: distance_miles(distance),
        duration_minutes: duration_minutes(duration),
    })
}

/// Text content of the first element matching `css`, empty if absent.
fn select_text(document: &Html, css: &str) -> String {
    let selector = Selector::parse(css).expect("Invalid tracking page selector");

    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
}

/// Text of the detail cells that share a container with the "Distance"
/// header. Tracking pages nest the figures in sibling cells, so the walk
/// is header, up to its parent, down into every detail cell.
fn distance_cell_text(document: &Html) -> String {
    let headers = Selector::parse(SECONDARY_HEADER).expect("Invalid tracking page selector");
    let cells = Selector::parse(DETAIL_CELL).expect("Invalid tracking page selector");

    for header in document.select(&headers) {
        let text: String = header.text().collect();
        if !text.contains("Distance") {
            continue;
        }

        if let Some(parent) = header.parent().and_then(ElementRef::wrap) {
            let texts: Vec<String> = parent
                .select(&cells)
                .map(|cell| cell.text().collect::<String>())
                .collect();
            return texts.join(" ");
        }
    }

    String::new()
}

/// Collapse runs of whitespace (tracking pages indent cells heavily).
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
