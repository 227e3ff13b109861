//! Error types for flightstats

use thiserror::Error;

/// Main error type for flightstats operations
#[derive(Error, Debug)]
pub enum FlightStatsError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// HTTP request error (tracking-page fetch)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IMAP protocol error
    #[error("IMAP error: {0}")]
    Imap(#[from] imap::error::Error),

    /// TLS setup error
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    /// Mailbox-level failure (search failed, message unavailable)
    #[error("Mailbox error: {0}")]
    Mailbox(String),

    /// Message payload could not be decoded to text. Non-fatal: the
    /// pipeline records the message as yielding no bookings and moves on.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Tracking source returned an unusable response
    #[error("Tracking error: {0}")]
    Tracking(String),
}

/// Result type alias for flightstats operations
pub type Result<T> = std::result::Result<T, FlightStatsError>;
