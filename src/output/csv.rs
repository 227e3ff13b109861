//! CSV output writing

use crate::error::Result;
use crate::flights::FlightRecord;
use csv::Writer;
use log::debug;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Mutex;

/// Thread-safe CSV writer for the flight list
pub struct CsvWriter {
    writer: Mutex<Writer<BufWriter<File>>>,
    record_count: Mutex<u64>,
}

impl CsvWriter {
    /// Create a new CSV writer with the header already written
    ///
    /// # Arguments
    /// * `output_path` - Path to the output CSV file
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written to.
    pub fn new(output_path: &Path) -> Result<Self> {
        // Create parent directory if needed
        if let Some(parent) = output_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(output_path)?;
        let buf_writer = BufWriter::with_capacity(64 * 1024, file);
        let mut writer = Writer::from_writer(buf_writer);

        writer.write_record(["Date", "Flight Code", "From", "To", "Distance", "Duration"])?;
        writer.flush()?;

        debug!("Created CSV writer at {}", output_path.display());

        Ok(Self {
            writer: Mutex::new(writer),
            record_count: Mutex::new(0),
        })
    }

    /// Write a batch of flights to the CSV file
    ///
    /// An unknown distance becomes an empty field; the duration is always
    /// written in minutes.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    ///
    /// # Panics
    /// Panics if the mutex is poisoned.
    #[allow(clippy::significant_drop_tightening)]
    pub fn write_flights(&self, flights: &[FlightRecord]) -> Result<()> {
        let mut writer = self.writer.lock().unwrap();
        let mut count = self.record_count.lock().unwrap();

        for flight in flights {
            let distance = flight
                .distance_miles
                .map(|miles| miles.to_string())
                .unwrap_or_default();
            let duration = flight.duration_minutes.to_string();

            writer.write_record([
                flight.date.as_str(),
                flight.code.as_str(),
                flight.from.as_str(),
                flight.to.as_str(),
                distance.as_str(),
                duration.as_str(),
            ])?;
            *count += 1;
        }

        Ok(())
    }

    /// Flush the writer to ensure all data is written
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    ///
    /// # Panics
    /// Panics if the mutex is poisoned.
    pub fn flush(&self) -> Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writer.flush()?;
        drop(writer);
        Ok(())
    }

    /// Get the number of records written
    ///
    /// # Panics
    /// Panics if the mutex is poisoned.
    pub fn record_count(&self) -> u64 {
        *self.record_count.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn flight(date: &str, code: &str, distance: Option<u64>, duration: u64) -> FlightRecord {
        FlightRecord {
            date: date.to_string(),
            code: code.to_string(),
            from: "Frankfurt Int'l (FRA)".to_string(),
            to: "Houston (IAH)".to_string(),
            distance_miles: distance,
            duration_minutes: duration,
        }
    }

    #[test]
    fn test_csv_writer_creation() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("flightdata.csv");
        let writer = CsvWriter::new(&output_path).unwrap();
        assert_eq!(writer.record_count(), 0);

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains("Date,Flight Code,From,To,Distance,Duration"));
    }

    #[test]
    fn test_csv_writer_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("out").join("flightdata.csv");
        CsvWriter::new(&output_path).unwrap();
        assert!(output_path.exists());
    }

    #[test]
    fn test_csv_write_flights() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("flightdata.csv");
        let writer = CsvWriter::new(&output_path).unwrap();

        let flights = vec![
            flight("5Jan24", "LH441", Some(5201), 620),
            flight("9Jan24", "LH440", Some(5201), 595),
        ];
        writer.write_flights(&flights).unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.record_count(), 2);

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains("5Jan24,LH441,Frankfurt Int'l (FRA),Houston (IAH),5201,620"));
        assert!(content.contains("9Jan24,LH440"));
    }

    #[test]
    fn test_csv_unknown_distance_is_empty_field() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("flightdata.csv");
        let writer = CsvWriter::new(&output_path).unwrap();

        writer
            .write_flights(&[flight("5Jan24", "LH441", None, 45)])
            .unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains("Houston (IAH),,45"));
    }
}
