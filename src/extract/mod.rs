//! Lexical extraction of flight codes and travel dates from message bodies

use crate::error::{FlightStatsError, Result};
use mailparse::ParsedMail;
use regex::Regex;
use std::sync::LazyLock;

/// Flight-code pattern: leading whitespace, a 2-3 character airline
/// designator (two letters, letter+digit or digit+letter, optional third
/// letter), then 1-4 digits and an optional trailing letter.
///
/// The leading whitespace is part of the match and is trimmed off when the
/// codes are recorded into a booking. No semantic validation happens here;
/// bogus matches are weeded out later when resolution fails for them.
static FLIGHT_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s(?:[a-z]{2}|[a-z][0-9]|[0-9][a-z])[a-z]?[0-9]{1,4}[a-z]?")
        .expect("Invalid FLIGHT_CODE_REGEX pattern")
});

/// Travel-date pattern: 1-2 digit day, optional `-`/whitespace separator,
/// a month abbreviation (English plus the German spellings Mai/Okt/Dez),
/// optional separator, 2- or 4-digit year.
static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-3]?[0-9][\s-]?(?:jan|feb|mar|apr|mai|jun|jul|aug|sep|o[ck]t|nov|de[cz])[\s-]?(?:19|20)?[0-9]{2}")
        .expect("Invalid DATE_REGEX pattern")
});

/// Rendering width used when flattening HTML bodies to text
const BODY_TEXT_WIDTH: usize = 80;

/// Extract every flight-code-like substring from `text`, in match order.
///
/// Matches are returned verbatim (original casing, leading whitespace
/// included); both trimming and de-duplication belong to
/// [`crate::booking::MessageBooking`].
#[must_use]
pub fn extract_flight_codes(text: &str) -> Vec<String> {
    FLIGHT_CODE_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract every date-like substring from `text`, in match order.
///
/// Matches are returned verbatim; normalization (separator stripping) and
/// de-duplication belong to [`crate::booking::MessageBooking`].
#[must_use]
pub fn extract_dates(text: &str) -> Vec<String> {
    DATE_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Decode a raw RFC 822 payload to plain text.
///
/// Booking mail is almost always multipart with the useful content in the
/// HTML part, so that part is preferred and rendered to text; a
/// `text/plain` part is the fallback, then the top-level body.
///
/// # Errors
/// Returns [`FlightStatsError::Decode`] if the payload cannot be parsed or
/// a selected part cannot be decoded. The pipeline treats this as the
/// non-fatal "extraction failed" outcome for the message.
pub fn message_text(raw: &[u8]) -> Result<String> {
    let parsed = mailparse::parse_mail(raw)
        .map_err(|e| FlightStatsError::Decode(format!("malformed message payload: {e}")))?;

    if let Some(html) = find_part(&parsed, "text/html") {
        let text = html2text::from_read(html.as_bytes(), BODY_TEXT_WIDTH)
            .map_err(|e| FlightStatsError::Decode(format!("HTML part not renderable: {e}")))?;
        return Ok(text);
    }

    if let Some(plain) = find_part(&parsed, "text/plain") {
        return Ok(plain);
    }

    parsed
        .get_body()
        .map_err(|e| FlightStatsError::Decode(format!("undecodable message body: {e}")))
}

/// Depth-first search for the first part with the given MIME type.
fn find_part(part: &ParsedMail, mimetype: &str) -> Option<String> {
    if part.ctype.mimetype.eq_ignore_ascii_case(mimetype) {
        return part.get_body().ok();
    }

    for sub in &part.subparts {
        if let Some(text) = find_part(sub, mimetype) {
            return Some(text);
        }
    }

    None
}
