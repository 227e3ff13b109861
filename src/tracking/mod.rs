//! Resolution of flight codes against a tracking site

pub mod page;

use crate::error::{FlightStatsError, Result};
use log::{debug, warn};
use std::time::Duration;

/// Base URL of the tracking site; the flight code is appended verbatim.
pub const TRACKING_URL_BASE: &str = "https://flightaware.com/live/flight/";

/// Route details for one resolved flight code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightInfo {
    /// Departure airport as rendered by the tracking page
    pub from: String,
    /// Arrival airport as rendered by the tracking page
    pub to: String,
    /// Direct distance in miles, absent when the page carries no figure
    pub distance_miles: Option<u64>,
    /// Scheduled duration in minutes
    pub duration_minutes: u64,
}

/// Where tracking pages come from.
///
/// The pipeline only ever calls [`TrackingSource::resolve`]; implementors
/// provide the raw page fetch. Tests substitute a canned source, the real
/// runs use [`HttpTrackingSource`].
pub trait TrackingSource {
    /// Fetch the raw tracking page for `code`.
    ///
    /// # Errors
    /// Returns an error when the page cannot be retrieved.
    fn fetch_page(&self, code: &str) -> Result<String>;

    /// Resolve `code` to flight details, or `None` when the fetch fails
    /// or the page shows no flight. Failures only cost this one code.
    fn resolve(&self, code: &str) -> Option<FlightInfo> {
        let html = match self.fetch_page(code) {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to fetch tracking page for {code}: {e}");
                return None;
            }
        };

        let info = page::parse_tracking_page(&html);
        if info.is_none() {
            debug!("No tracking data found for flight code {code}");
        }
        info
    }
}

/// Tracking source backed by HTTP requests to the live tracking site.
pub struct HttpTrackingSource {
    client: reqwest::blocking::Client,
}

impl HttpTrackingSource {
    /// Build a source whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("flightstats/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Tracking page URL for a flight code, pinned to the English locale
    /// so the parsed labels stay stable.
    fn page_url(code: &str) -> String {
        format!("{TRACKING_URL_BASE}{code}?locale=en_US")
    }
}

impl TrackingSource for HttpTrackingSource {
    fn fetch_page(&self, code: &str) -> Result<String> {
        let response = self.client.get(Self::page_url(code)).send()?;

        if !response.status().is_success() {
            return Err(FlightStatsError::Tracking(format!(
                "tracking site returned {} for {code}",
                response.status()
            )));
        }

        Ok(response.text()?)
    }
}
