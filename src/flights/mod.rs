//! Joining bookings with resolved tracking data into the flight list

use crate::booking::MessageBooking;
use crate::tracking::FlightInfo;
use std::collections::{HashMap, HashSet};

/// One flight a message claims was taken, joined with its route details.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightRecord {
    /// Normalized travel date, e.g. "10Feb2024"
    pub date: String,
    /// Flight code as extracted, e.g. "LH441"
    pub code: String,
    pub from: String,
    pub to: String,
    pub distance_miles: Option<u64>,
    pub duration_minutes: u64,
}

/// Join bookings with resolved flight details.
///
/// Within each booking the pairing is positional: the n-th date goes with
/// the n-th code that survived pruning, and leftovers on either side are
/// dropped. Records that come out structurally identical (same date,
/// code and details) are emitted once, keeping first-seen order across
/// the whole mailbox.
#[must_use]
pub fn build_flight_list(
    bookings: &[MessageBooking],
    frequency: &HashMap<String, usize>,
    resolved: &HashMap<String, FlightInfo>,
) -> Vec<FlightRecord> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for booking in bookings {
        let valid_codes = booking
            .codes()
            .iter()
            .filter(|code| frequency.contains_key(*code));

        for (date, code) in booking.dates().iter().zip(valid_codes) {
            let Some(info) = resolved.get(code) else {
                continue;
            };

            let record = FlightRecord {
                date: date.clone(),
                code: code.clone(),
                from: info.from.clone(),
                to: info.to.clone(),
                distance_miles: info.distance_miles,
                duration_minutes: info.duration_minutes,
            };

            if seen.insert(record.clone()) {
                records.push(record);
            }
        }
    }

    records
}
