//! Export of the flight list

pub mod csv;

pub use csv::CsvWriter;
