//! BER result sinks
//!
//! The estimator reports `(SNR, BER)` pairs in SNR-ascending order per
//! scheme through the [`BerSink`] contract. [`CsvBerSink`] writes the
//! `ber_<scheme>.csv` artifact; [`MemorySink`] collects points in memory
//! for tests.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::types::SimResult;

/// Receiver of per-SNR-point BER results.
pub trait BerSink {
    /// Record one `(snr_db, ber)` pair. Points arrive in ascending SNR order.
    fn record(&mut self, snr_db: f64, ber: f64) -> SimResult<()>;
}

/// CSV file sink: header `SNR_dB,BER`, one row per SNR point, both values
/// with 12 digits after the decimal point.
#[derive(Debug)]
pub struct CsvBerSink {
    writer: BufWriter<File>,
}

impl CsvBerSink {
    /// Create (or overwrite) the CSV file and write the header line.
    pub fn create<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "SNR_dB,BER")?;
        Ok(Self { writer })
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> SimResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl BerSink for CsvBerSink {
    fn record(&mut self, snr_db: f64, ber: f64) -> SimResult<()> {
        writeln!(self.writer, "{snr_db:.12},{ber:.12}")?;
        Ok(())
    }
}

/// In-memory sink for tests and programmatic use.
#[derive(Debug, Default)]
pub struct MemorySink {
    points: Vec<(f64, f64)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(snr_db, ber)` pairs, in arrival order.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

impl BerSink for MemorySink {
    fn record(&mut self, snr_db: f64, ber: f64) -> SimResult<()> {
        self.points.push((snr_db, ber));
        Ok(())
    }
}
