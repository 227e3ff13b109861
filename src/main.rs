//! FlightStats - Flight statistics from booking mail in an IMAP mailbox
//!
//! This tool searches a mailbox for booking confirmations, extracts flight
//! codes and travel dates, resolves each code against a tracking site and
//! exports the resulting flight list to a CSV file.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use flightstats::cli::Args;
use flightstats::mailbox::ImapMailbox;
use flightstats::processor::Processor;
use flightstats::tracking::HttpTrackingSource;
use flightstats::Config;
use log::{error, info};
use std::time::Instant;

/// Environment variable holding the IMAP password
const PASSWORD_ENV: &str = "FLIGHTSTATS_IMAP_PASSWORD";

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("FlightStats - Flight Statistics");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Convert args to config
    let config: Config = args.into();

    info!(
        "Mailbox: {}@{}:{} ({})",
        config.user, config.server, config.port, config.folder
    );
    info!("Output file: {}", config.output_path.display());

    // The password never goes on the command line
    let Ok(password) = std::env::var(PASSWORD_ENV) else {
        error!("No password found; set {PASSWORD_ENV}");
        std::process::exit(1);
    };

    let start = Instant::now();
    info!("Starting processing...");

    // Create and run processor
    let mailbox = ImapMailbox::new(&config, password);
    let tracking = HttpTrackingSource::new(config.timeout())?;
    let processor = Processor::new(config, mailbox, tracking);
    processor.run()?;

    let elapsed = start.elapsed();
    info!("Processing completed in {elapsed:?}");

    Ok(())
}
