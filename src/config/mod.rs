//! Configuration structures for FlightStats

use crate::cli::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for the FlightStats processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IMAP server host name
    pub server: String,

    /// IMAP server port
    pub port: u16,

    /// Account to log in as
    pub user: String,

    /// Mailbox folder to search
    pub folder: String,

    /// Path to the RON file listing booking sender addresses
    pub senders_path: PathBuf,

    /// Path to output CSV file
    pub output_path: PathBuf,

    /// Maximum number of messages to process, newest first
    pub max_results: usize,

    /// Maximum number of worker threads (0 = auto)
    pub max_workers: usize,

    /// Seconds before a single network operation is abandoned
    pub timeout_secs: u64,

    /// Enable debug logging
    pub debug_mode: bool,
}

impl Config {
    /// Per-operation network timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: "imap.gmail.com".to_string(),
            port: 993,
            user: String::new(),
            folder: "INBOX".to_string(),
            senders_path: PathBuf::from("config/senders.ron"),
            output_path: PathBuf::from("out/flightdata.csv"),
            max_results: 300,
            max_workers: 0,
            timeout_secs: 30,
            debug_mode: false,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            server: args.server,
            port: args.port,
            user: args.user,
            folder: args.folder,
            senders_path: args.senders,
            output_path: args.output,
            max_results: args.max_results,
            max_workers: args.workers,
            timeout_secs: args.timeout_secs,
            debug_mode: args.debug,
        }
    }
}

/// Booking sender addresses loaded from a RON file
#[derive(Debug, Deserialize)]
pub struct SendersConfig {
    /// Addresses booking confirmations come from
    pub senders: Vec<String>,
}

impl Default for SendersConfig {
    fn default() -> Self {
        Self {
            senders: vec![
                "noreply@lufthansa.com".into(),
                "bookingconfirmation@lufthansa.com".into(),
                "no-reply@eurowings.com".into(),
                "confirmation@airberlin.com".into(),
                "noreply@swiss.com".into(),
                "noreply@austrian.com".into(),
                "noreply@ryanair.com".into(),
                "noreply@easyjet.com".into(),
                "service@condor.com".into(),
                "auftrag@expedia.de".into(),
                "reisebestaetigung@opodo.de".into(),
            ],
        }
    }
}

impl SendersConfig {
    /// Load the sender list from a RON file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, SendersLoadError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = ron::from_str(&content)?;
        Ok(config)
    }

    /// Load the sender list from file or use defaults if it doesn't exist
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load_from_file(path).unwrap_or_else(|e| {
                log::warn!(
                    "Failed to load senders from {}: {e}. Using defaults.",
                    path.display()
                );
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}

/// Error type for sender list loading
#[derive(Debug, thiserror::Error)]
pub enum SendersLoadError {
    /// IO error reading file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// RON parse error
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}
