//! Mailbox access behind a narrow seam

pub mod imap_client;

pub use imap_client::ImapMailbox;

use crate::error::Result;

/// A searchable source of booking messages.
///
/// The pipeline needs exactly two things from a mailbox: which messages
/// match the sender filter, and the decoded text of one message. Tests
/// implement this over canned data, the real runs use [`ImapMailbox`].
pub trait Mailbox {
    /// UIDs matching `query`, newest first, already capped to the
    /// configured maximum.
    ///
    /// # Errors
    /// Returns an error when the mailbox cannot be searched.
    fn search(&self, query: &str) -> Result<Vec<u32>>;

    /// Decoded text of the message with the given UID.
    ///
    /// # Errors
    /// Returns [`crate::FlightStatsError::Decode`] when the payload is
    /// unreadable (the pipeline treats that message as empty), any other
    /// error when the message cannot be fetched at all.
    fn fetch_body(&self, uid: u32) -> Result<String>;
}

/// Build the IMAP search criterion for a list of booking senders.
///
/// IMAP `OR` is binary and prefix, so three senders become
/// `OR FROM "a" OR FROM "b" FROM "c"`. An empty sender list means no
/// filtering at all.
#[must_use]
pub fn sender_query(senders: &[String]) -> String {
    match senders {
        [] => "ALL".to_string(),
        [single] => format!("FROM \"{single}\""),
        [first, rest @ ..] => format!("OR FROM \"{first}\" {}", sender_query(rest)),
    }
}
