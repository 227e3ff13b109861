//! Per-message booking data and mailbox-wide aggregation

use std::collections::HashMap;

/// Flight codes and travel dates recovered from a single message.
///
/// Codes and dates are kept in match order because the flight-list builder
/// pairs them positionally: the first date in a message belongs to the
/// first (still valid) code, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBooking {
    codes: Vec<String>,
    dates: Vec<String>,
}

impl MessageBooking {
    /// Build a booking from raw extractor matches.
    ///
    /// Codes are trimmed of the surrounding whitespace the pattern
    /// includes; dates are normalized by dropping whitespace and `-`
    /// separators ("10-Feb-2024" becomes "10Feb2024"). Both sequences are
    /// de-duplicated keeping the first occurrence, so feeding a booking's
    /// own contents back in changes nothing.
    #[must_use]
    pub fn new(raw_codes: Vec<String>, raw_dates: Vec<String>) -> Self {
        let mut booking = Self::default();

        for raw in raw_codes {
            let code = raw.trim().to_string();
            if !code.is_empty() && !booking.codes.contains(&code) {
                booking.codes.push(code);
            }
        }

        for raw in raw_dates {
            let date = normalize_date(&raw);
            if !date.is_empty() && !booking.dates.contains(&date) {
                booking.dates.push(date);
            }
        }

        booking
    }

    /// Sentinel for a message whose body could not be decoded.
    ///
    /// Contributes nothing to the frequency map or the flight list but
    /// keeps the bookings vector aligned with the fetched messages.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    #[must_use]
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty() && self.dates.is_empty()
    }
}

/// Strip whitespace and `-` separators from a raw date match.
fn normalize_date(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Count how many messages mention each flight code.
///
/// One message contributes at most one count per code since bookings are
/// de-duplicated at construction. The resulting key set is the candidate
/// list handed to resolution.
#[must_use]
pub fn build_frequency_map(bookings: &[MessageBooking]) -> HashMap<String, usize> {
    let mut frequency: HashMap<String, usize> = HashMap::new();

    for booking in bookings {
        for code in booking.codes() {
            *frequency.entry(code.clone()).or_insert(0) += 1;
        }
    }

    frequency
}

/// Drop every code from `frequency` that did not resolve.
///
/// Returns the number of codes removed. After pruning, the frequency map
/// and the resolved map hold exactly the same key set, which is what the
/// flight-list builder relies on.
pub fn prune_unresolved<V>(
    frequency: &mut HashMap<String, usize>,
    resolved: &HashMap<String, V>,
) -> usize {
    let before = frequency.len();
    frequency.retain(|code, _| resolved.contains_key(code));
    before - frequency.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_and_normalizes() {
        let booking = MessageBooking::new(
            vec![" AA123".to_string(), "\nBA456".to_string()],
            vec!["5 Jan 24".to_string(), "10-Feb-2024".to_string()],
        );

        assert_eq!(booking.codes(), ["AA123", "BA456"]);
        assert_eq!(booking.dates(), ["5Jan24", "10Feb2024"]);
    }

    #[test]
    fn test_new_deduplicates_keeping_first_occurrence() {
        let booking = MessageBooking::new(
            vec![
                " AA123".to_string(),
                " BA456".to_string(),
                " AA123".to_string(),
            ],
            vec![
                "5 Jan 24".to_string(),
                "5-Jan-24".to_string(),
                "6 Jan 24".to_string(),
            ],
        );

        assert_eq!(booking.codes(), ["AA123", "BA456"]);
        // "5 Jan 24" and "5-Jan-24" normalize to the same date.
        assert_eq!(booking.dates(), ["5Jan24", "6Jan24"]);
    }

    #[test]
    fn test_new_is_idempotent() {
        let first = MessageBooking::new(
            vec![" AA123".to_string(), " AA123".to_string()],
            vec!["5 Jan 24".to_string()],
        );
        let second = MessageBooking::new(first.codes().to_vec(), first.dates().to_vec());

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_sentinel() {
        let booking = MessageBooking::empty();
        assert!(booking.is_empty());
        assert!(booking.codes().is_empty());
        assert!(booking.dates().is_empty());
    }

    #[test]
    fn test_frequency_counts_across_bookings() {
        let bookings = vec![
            MessageBooking::new(
                vec![" AA123".to_string(), " BA456".to_string()],
                vec![],
            ),
            MessageBooking::new(vec![" AA123".to_string()], vec![]),
            MessageBooking::empty(),
        ];

        let frequency = build_frequency_map(&bookings);
        assert_eq!(frequency.len(), 2);
        assert_eq!(frequency["AA123"], 2);
        assert_eq!(frequency["BA456"], 1);
    }

    #[test]
    fn test_frequency_of_empty_input() {
        let frequency = build_frequency_map(&[]);
        assert!(frequency.is_empty());
    }

    #[test]
    fn test_prune_unresolved_drops_missing_codes() {
        let mut frequency = HashMap::new();
        frequency.insert("AA123".to_string(), 2);
        frequency.insert("XX999".to_string(), 1);

        let mut resolved: HashMap<String, ()> = HashMap::new();
        resolved.insert("AA123".to_string(), ());

        let removed = prune_unresolved(&mut frequency, &resolved);
        assert_eq!(removed, 1);
        assert_eq!(frequency.len(), 1);
        assert!(frequency.contains_key("AA123"));
    }

    #[test]
    fn test_prune_with_everything_resolved() {
        let mut frequency = HashMap::new();
        frequency.insert("AA123".to_string(), 1);

        let mut resolved: HashMap<String, ()> = HashMap::new();
        resolved.insert("AA123".to_string(), ());

        assert_eq!(prune_unresolved(&mut frequency, &resolved), 0);
        assert_eq!(frequency.len(), 1);
    }
}
