//! IMAP-backed mailbox over TLS

use super::Mailbox;
use crate::config::Config;
use crate::error::{FlightStatsError, Result};
use crate::extract;
use log::debug;
use native_tls::{TlsConnector, TlsStream};
use std::net::TcpStream;

type TlsSession = imap::Session<TlsStream<TcpStream>>;

/// Fetch query that returns the full payload without marking messages
/// as read
const FETCH_QUERY: &str = "(UID BODY.PEEK[])";

/// Mailbox reached over IMAP with TLS.
///
/// Every operation runs on its own short-lived session, so the value is
/// cheap to share across worker threads and a dropped connection only
/// costs the one operation it interrupts.
pub struct ImapMailbox {
    server: String,
    port: u16,
    user: String,
    password: String,
    folder: String,
    max_results: usize,
}

impl ImapMailbox {
    #[must_use]
    pub fn new(config: &Config, password: String) -> Self {
        Self {
            server: config.server.clone(),
            port: config.port,
            user: config.user.clone(),
            password,
            folder: config.folder.clone(),
            max_results: config.max_results,
        }
    }

    /// Open a fresh session with the configured folder selected.
    fn session(&self) -> Result<TlsSession> {
        let tls = TlsConnector::builder().build()?;
        let client = imap::connect((self.server.as_str(), self.port), self.server.as_str(), &tls)?;

        let mut session = client
            .login(&self.user, &self.password)
            .map_err(|(e, _)| e)?;
        session.select(&self.folder)?;

        Ok(session)
    }
}

impl Mailbox for ImapMailbox {
    fn search(&self, query: &str) -> Result<Vec<u32>> {
        let mut session = self.session()?;
        let matched = session.uid_search(query)?;
        session.logout().ok();

        debug!(
            "Search matched {} messages in {}, keeping up to {}",
            matched.len(),
            self.folder,
            self.max_results
        );

        Ok(newest_first(matched, self.max_results))
    }

    fn fetch_body(&self, uid: u32) -> Result<String> {
        let mut session = self.session()?;
        let messages = session.uid_fetch(uid.to_string(), FETCH_QUERY)?;

        let text = messages
            .iter()
            .next()
            .and_then(|message| message.body())
            .ok_or_else(|| FlightStatsError::Mailbox(format!("no body returned for UID {uid}")))
            .and_then(extract::message_text)?;

        session.logout().ok();
        Ok(text)
    }
}

/// Sort UIDs newest first and cap the result.
///
/// UIDs grow with arrival order within a folder, so descending UID order
/// is descending arrival order.
fn newest_first(uids: impl IntoIterator<Item = u32>, max_results: usize) -> Vec<u32> {
    let mut uids: Vec<u32> = uids.into_iter().collect();
    uids.sort_unstable_by(|a, b| b.cmp(a));
    uids.truncate(max_results);
    uids
}
