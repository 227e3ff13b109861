//! Main pipeline orchestration with parallel processing

use crate::booking::{self, MessageBooking};
use crate::config::{Config, SendersConfig};
use crate::error::{FlightStatsError, Result};
use crate::extract;
use crate::flights::{self, FlightRecord};
use crate::mailbox::{sender_query, Mailbox};
use crate::output::CsvWriter;
use crate::stats::{self, StatsSummary};
use crate::tracking::{FlightInfo, TrackingSource};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

/// Batch size for CSV writes
const BATCH_SIZE: usize = 1000;

/// Worker cap when none is configured; both fan-outs are network bound,
/// so more threads mostly means more parallel connections
const DEFAULT_WORKER_CAP: usize = 8;

/// Main processor for the mailbox-to-statistics pipeline
pub struct Processor<M, T> {
    config: Config,
    mailbox: M,
    tracking: T,
}

impl<M, T> Processor<M, T>
where
    M: Mailbox + Sync,
    T: TrackingSource + Sync,
{
    /// Create a new processor with the given configuration
    pub fn new(config: Config, mailbox: M, tracking: T) -> Self {
        info!(
            "Processor initialized. Server: {}:{}, folder: {}",
            config.server, config.port, config.folder
        );

        Self {
            config,
            mailbox,
            tracking,
        }
    }

    /// Run the whole pipeline: search, extract, resolve, join, export.
    ///
    /// # Errors
    /// Returns an error if the mailbox cannot be read or the CSV cannot
    /// be written. Unreadable single messages and unresolvable flight
    /// codes are logged and skipped instead.
    ///
    /// # Panics
    /// May panic if the progress bar template is invalid.
    pub fn run(&self) -> Result<StatsSummary> {
        let senders = SendersConfig::load_or_default(&self.config.senders_path);
        let query = sender_query(&senders.senders);
        debug!("Mailbox query: {query}");

        let uids = self.search_mailbox(&query)?;
        if uids.is_empty() {
            warn!("No booking messages found");
            self.write_csv(&[])?;
            return Ok(StatsSummary::default());
        }

        info!("Found {} booking message(s) to scan", uids.len());

        let bookings = self.collect_bookings(&uids)?;
        let mut frequency = booking::build_frequency_map(&bookings);
        info!(
            "Found {} distinct flight code(s) in {} message(s)",
            frequency.len(),
            bookings.len()
        );

        let resolved = self.resolve_codes(&frequency);
        let pruned = booking::prune_unresolved(&mut frequency, &resolved);
        if pruned > 0 {
            info!("Dropped {pruned} flight code(s) without tracking data");
        }

        let flight_list = flights::build_flight_list(&bookings, &frequency, &resolved);
        let summary = stats::summarize(&flight_list);

        info!("Results:");
        info!("  Total Flights: {}", summary.total_flights);
        info!("  Total Time: {} minutes", summary.total_duration_minutes);
        info!("  Total Distance: {} miles", summary.total_distance_miles);

        self.write_csv(&flight_list)?;

        Ok(summary)
    }

    /// Search the mailbox behind a spinner
    fn search_mailbox(&self, query: &str) -> Result<Vec<u32>> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message("Searching for booking messages...");

        let uids = self.mailbox.search(query);
        spinner.finish_and_clear();
        uids
    }

    /// Fetch every message and extract its booking data in parallel.
    ///
    /// The result stays aligned with `uids`: one booking per message, in
    /// input order, with undecodable messages represented by an empty
    /// booking. All fetches run to completion before the first fatal
    /// error (if any) is surfaced.
    fn collect_bookings(&self, uids: &[u32]) -> Result<Vec<MessageBooking>> {
        let progress_bar = batch_progress_bar(uids.len() as u64, "Retrieving flight codes");

        let results: Vec<Result<MessageBooking>> = self.with_worker_pool(uids.len(), || {
            uids.par_iter()
                .map(|&uid| {
                    let booking = self.booking_from_message(uid);
                    progress_bar.inc(1);
                    booking
                })
                .collect()
        });

        progress_bar.finish_with_message("done");

        let mut bookings = Vec::with_capacity(results.len());
        for result in results {
            bookings.push(result?);
        }

        Ok(bookings)
    }

    /// Extract the booking from a single message
    fn booking_from_message(&self, uid: u32) -> Result<MessageBooking> {
        let text = match self.mailbox.fetch_body(uid) {
            Ok(text) => text,
            Err(FlightStatsError::Decode(reason)) => {
                warn!("Skipping undecodable message UID {uid}: {reason}");
                return Ok(MessageBooking::empty());
            }
            Err(e) => return Err(e),
        };

        let booking = MessageBooking::new(
            extract::extract_flight_codes(&text),
            extract::extract_dates(&text),
        );
        debug!(
            "UID {uid}: {} code(s), {} date(s)",
            booking.codes().len(),
            booking.dates().len()
        );

        Ok(booking)
    }

    /// Resolve every distinct flight code against the tracking source.
    ///
    /// Codes are visited in sorted order so runs over the same mailbox
    /// hit the tracking site in the same sequence. Codes that fail to
    /// resolve are simply absent from the returned map.
    fn resolve_codes(&self, frequency: &HashMap<String, usize>) -> HashMap<String, FlightInfo> {
        let mut codes: Vec<String> = frequency.keys().cloned().collect();
        codes.sort_unstable();

        let progress_bar = batch_progress_bar(codes.len() as u64, "Retrieving flight info");

        let resolved: Vec<(String, Option<FlightInfo>)> =
            self.with_worker_pool(codes.len(), || {
                codes
                    .par_iter()
                    .map(|code| {
                        let info = self.tracking.resolve(code);
                        progress_bar.inc(1);
                        (code.clone(), info)
                    })
                    .collect()
            });

        progress_bar.finish_with_message("done");

        resolved
            .into_iter()
            .filter_map(|(code, info)| info.map(|info| (code, info)))
            .collect()
    }

    /// Write the flight list to the configured CSV file
    fn write_csv(&self, flight_list: &[FlightRecord]) -> Result<()> {
        info!("Writing {} flight(s) to CSV...", flight_list.len());

        let csv_writer = CsvWriter::new(&self.config.output_path)?;
        for chunk in flight_list.chunks(BATCH_SIZE) {
            csv_writer.write_flights(chunk)?;
        }
        csv_writer.flush()?;

        info!(
            "Wrote {} flight(s) to {}",
            csv_writer.record_count(),
            self.config.output_path.display()
        );

        Ok(())
    }

    /// Run `op` on a pool sized for this batch
    fn with_worker_pool<R: Send>(&self, batch: usize, op: impl FnOnce() -> R + Send) -> R {
        let workers = self.worker_count(batch);

        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(op),
            Err(e) => {
                warn!("Failed to configure thread pool: {e}. Using default.");
                op()
            }
        }
    }

    /// Worker threads for a batch: the configured maximum (or the default
    /// cap), never more than the batch itself, never zero
    fn worker_count(&self, batch: usize) -> usize {
        let cap = if self.config.max_workers == 0 {
            DEFAULT_WORKER_CAP
        } else {
            self.config.max_workers
        };

        cap.min(batch).max(1)
    }
}

/// Progress bar for a batch phase
fn batch_progress_bar(len: u64, msg: &str) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    progress_bar.set_message(msg.to_string());
    progress_bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct StubMailbox {
        messages: Vec<&'static str>,
        fail_uid: Option<u32>,
        fatal: bool,
    }

    impl StubMailbox {
        fn with_messages(messages: Vec<&'static str>) -> Self {
            Self {
                messages,
                fail_uid: None,
                fatal: false,
            }
        }
    }

    impl Mailbox for StubMailbox {
        fn search(&self, _query: &str) -> Result<Vec<u32>> {
            Ok((1..=self.messages.len() as u32).collect())
        }

        fn fetch_body(&self, uid: u32) -> Result<String> {
            if self.fail_uid == Some(uid) {
                if self.fatal {
                    return Err(FlightStatsError::Mailbox(format!(
                        "connection lost fetching UID {uid}"
                    )));
                }
                return Err(FlightStatsError::Decode(format!(
                    "bad base64 in UID {uid}"
                )));
            }
            Ok(self.messages[(uid - 1) as usize].to_string())
        }
    }

    struct StubTracking {
        known: HashMap<String, FlightInfo>,
    }

    impl StubTracking {
        fn with_flights(entries: &[(&str, FlightInfo)]) -> Self {
            let known = entries
                .iter()
                .map(|(code, info)| ((*code).to_string(), info.clone()))
                .collect();
            Self { known }
        }
    }

    impl TrackingSource for StubTracking {
        fn fetch_page(&self, code: &str) -> Result<String> {
            Err(FlightStatsError::Tracking(format!(
                "no canned page for {code}"
            )))
        }

        fn resolve(&self, code: &str) -> Option<FlightInfo> {
            self.known.get(code).cloned()
        }
    }

    fn info(from: &str, to: &str, distance: Option<u64>, duration: u64) -> FlightInfo {
        FlightInfo {
            from: from.to_string(),
            to: to.to_string(),
            distance_miles: distance,
            duration_minutes: duration,
        }
    }

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            output_path: dir.join("flightdata.csv"),
            senders_path: dir.join("senders.ron"),
            max_workers: 2,
            ..Config::default()
        }
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let dir = tempdir().unwrap();
        let mailbox = StubMailbox::with_messages(vec![
            "Your flight LH441 departs on 5 Jan 24.",
            "Booking confirmed: BA456 on 10-Feb-2024.",
            "Dear customer, your parcel has been shipped.",
        ]);
        let tracking = StubTracking::with_flights(&[
            ("LH441", info("Frankfurt (FRA)", "Houston (IAH)", Some(5201), 620)),
            ("BA456", info("London (LHR)", "Madrid (MAD)", Some(785), 140)),
        ]);

        let processor = Processor::new(test_config(dir.path()), mailbox, tracking);
        let summary = processor.run().unwrap();

        assert_eq!(summary.total_flights, 2);
        assert_eq!(summary.total_distance_miles, 5986);
        assert_eq!(summary.total_duration_minutes, 760);

        let content = std::fs::read_to_string(dir.path().join("flightdata.csv")).unwrap();
        assert!(content.contains("Date,Flight Code,From,To,Distance,Duration"));
        assert!(content.contains("5Jan24,LH441,Frankfurt (FRA),Houston (IAH),5201,620"));
        assert!(content.contains("10Feb2024,BA456,London (LHR),Madrid (MAD),785,140"));
    }

    #[test]
    fn test_unresolved_code_is_pruned() {
        let dir = tempdir().unwrap();
        let mailbox = StubMailbox::with_messages(vec![
            "Flights XX999 and LH441 on 5 Jan 24 and 6 Jan 24.",
        ]);
        let tracking = StubTracking::with_flights(&[(
            "LH441",
            info("Frankfurt (FRA)", "Houston (IAH)", Some(5201), 620),
        )]);

        let processor = Processor::new(test_config(dir.path()), mailbox, tracking);
        let summary = processor.run().unwrap();

        // XX999 never resolves, so the first date pairs with LH441.
        assert_eq!(summary.total_flights, 1);

        let content = std::fs::read_to_string(dir.path().join("flightdata.csv")).unwrap();
        assert!(content.contains("5Jan24,LH441"));
        assert!(!content.contains("XX999"));
    }

    #[test]
    fn test_undecodable_message_is_skipped() {
        let dir = tempdir().unwrap();
        let mut mailbox = StubMailbox::with_messages(vec![
            "Your flight LH441 departs on 5 Jan 24.",
            "this one breaks",
        ]);
        mailbox.fail_uid = Some(2);
        let tracking = StubTracking::with_flights(&[(
            "LH441",
            info("Frankfurt (FRA)", "Houston (IAH)", Some(5201), 620),
        )]);

        let processor = Processor::new(test_config(dir.path()), mailbox, tracking);
        let summary = processor.run().unwrap();

        assert_eq!(summary.total_flights, 1);
    }

    #[test]
    fn test_fetch_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let mut mailbox = StubMailbox::with_messages(vec![
            "Your flight LH441 departs on 5 Jan 24.",
            "unreachable",
        ]);
        mailbox.fail_uid = Some(2);
        mailbox.fatal = true;
        let tracking = StubTracking::with_flights(&[]);

        let processor = Processor::new(test_config(dir.path()), mailbox, tracking);
        let result = processor.run();

        assert!(matches!(result, Err(FlightStatsError::Mailbox(_))));
    }

    #[test]
    fn test_empty_mailbox_writes_header_only_csv() {
        let dir = tempdir().unwrap();
        let mailbox = StubMailbox::with_messages(vec![]);
        let tracking = StubTracking::with_flights(&[]);

        let processor = Processor::new(test_config(dir.path()), mailbox, tracking);
        let summary = processor.run().unwrap();

        assert_eq!(summary, StatsSummary::default());

        let content = std::fs::read_to_string(dir.path().join("flightdata.csv")).unwrap();
        assert_eq!(
            content.trim(),
            "Date,Flight Code,From,To,Distance,Duration"
        );
    }

    #[test]
    fn test_same_flight_in_two_messages_counts_once() {
        let dir = tempdir().unwrap();
        let mailbox = StubMailbox::with_messages(vec![
            "Your flight LH441 departs on 5 Jan 24.",
            "Reminder: your flight LH441 departs on 5 Jan 24.",
        ]);
        let tracking = StubTracking::with_flights(&[(
            "LH441",
            info("Frankfurt (FRA)", "Houston (IAH)", Some(5201), 620),
        )]);

        let processor = Processor::new(test_config(dir.path()), mailbox, tracking);
        let summary = processor.run().unwrap();

        assert_eq!(summary.total_flights, 1);
        assert_eq!(summary.total_distance_miles, 5201);
    }
}
