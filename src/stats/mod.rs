//! Aggregate statistics over the final flight list

use crate::flights::FlightRecord;

/// Mailbox-wide totals reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSummary {
    /// Number of flights in the final list
    pub total_flights: usize,
    /// Sum of known distances in miles
    pub total_distance_miles: u64,
    /// Sum of durations in minutes, counted only for flights whose
    /// distance is known
    pub total_duration_minutes: u64,
}

/// Total up the flight list.
///
/// Every record counts toward `total_flights`, but a flight with an
/// unknown distance contributes to neither the mileage nor the time
/// total, so the two figures always describe the same set of flights.
#[must_use]
pub fn summarize(flights: &[FlightRecord]) -> StatsSummary {
    let mut summary = StatsSummary {
        total_flights: flights.len(),
        ..StatsSummary::default()
    };

    for flight in flights {
        if let Some(distance) = flight.distance_miles {
            summary.total_distance_miles += distance;
            summary.total_duration_minutes += flight.duration_minutes;
        }
    }

    summary
}
