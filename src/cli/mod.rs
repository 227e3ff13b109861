//! CLI argument parsing using clap

use clap::Parser;
use std::path::PathBuf;

/// FlightStats - Flight statistics from booking mail in an IMAP mailbox
#[derive(Parser, Debug)]
#[command(name = "flightstats")]
#[command(version)]
#[command(about = "Collects personal flight statistics from booking confirmations in a mailbox")]
#[command(long_about = None)]
pub struct Args {
    /// IMAP server host name
    #[arg(short, long, default_value = "imap.gmail.com")]
    pub server: String,

    /// IMAP server port
    #[arg(short, long, default_value = "993")]
    pub port: u16,

    /// Account to log in as
    #[arg(short, long)]
    pub user: String,

    /// Mailbox folder to search
    #[arg(short, long, default_value = "INBOX")]
    pub folder: String,

    /// Path to a RON file listing booking sender addresses
    #[arg(long, default_value = "config/senders.ron")]
    pub senders: PathBuf,

    /// Path to output CSV file
    #[arg(short, long, default_value = "out/flightdata.csv")]
    pub output: PathBuf,

    /// Maximum number of messages to process, newest first
    #[arg(long, default_value = "300")]
    pub max_results: usize,

    /// Maximum number of worker threads (0 = auto)
    #[arg(short, long, default_value = "0")]
    pub workers: usize,

    /// Seconds before a single network operation is abandoned
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
