//! FlightStats library - Core functionality for mailbox flight statistics

#![allow(clippy::multiple_crate_versions)] // Transitive dependencies

pub mod booking;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod flights;
pub mod mailbox;
pub mod output;
pub mod processor;
pub mod stats;
pub mod tracking;

pub use config::Config;
pub use error::{FlightStatsError, Result};
pub use flights::FlightRecord;
pub use stats::StatsSummary;
pub use tracking::FlightInfo;
