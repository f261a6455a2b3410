use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Result;
use crate::reading::{Reading, Timestamp};

pub const COLUMNS: [&str; 12] = [
    "Date",
    "Time",
    "LNA Voltage",
    "LNA Thermistor (Kohm)",
    "LNA (C)",
    "SP4T Voltage",
    "SP4T Thermistor (Kohm)",
    "SP4T (C)",
    "Load Voltage",
    "Load-thermistor (Kohm)",
    "Load (C)",
    "Internal_Temp(C)",
];

/// Terminal destination of every recorded reading.
pub trait ReadingSink {
    fn record(&mut self, reading: &Reading) -> Result<()>;
}

/// `<label>_<month>_<day>_<year>_<hour>_<minute>_<second>.csv`
pub fn log_file_name(label: &str, session_start: &Timestamp) -> String {
    format!("{}_{}.csv", label, session_start.file_stamp())
}

/// Comma separated session log. Every row is flushed as soon as it is written, so a session
/// that ends abruptly loses at most the row in flight.
#[derive(Debug)]
pub struct CsvLog<W: Write> {
    writer: W,
    rows: usize,
}

impl CsvLog<BufWriter<File>> {
    /// Creates the session log in `directory`, failing if a file with the same name exists.
    pub fn create(directory: &Path, label: &str, session_start: &Timestamp)
            -> Result<(CsvLog<BufWriter<File>>, PathBuf)> {
        let path = directory.join(log_file_name(label, session_start));
        let file = File::options().write(true).create_new(true).open(&path)?;
        log::info!("logging to {}", path.display());
        Ok((CsvLog::new(BufWriter::new(file))?, path))
    }
}

impl<W: Write> CsvLog<W> {
    pub fn new(mut writer: W) -> Result<CsvLog<W>> {
        writeln!(writer, "{}", COLUMNS.join(","))?;
        writer.flush()?;
        Ok(CsvLog { writer, rows: 0 })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_row(&mut self, reading: &Reading) -> std::io::Result<()> {
        write!(self.writer, "{},{}", reading.timestamp.date_field(), reading.timestamp.time_field())?;
        for sample in reading.channels.iter() {
            write!(self.writer, ",{:.3},{:.1},{:.2}", sample.voltage, sample.resistance, sample.celsius)?;
        }
        writeln!(self.writer, ",{:.2}", reading.internal_celsius)?;
        self.writer.flush()
    }
}

impl<W: Write> ReadingSink for CsvLog<W> {
    fn record(&mut self, reading: &Reading) -> Result<()> {
        self.write_row(reading)?;
        self.rows += 1;
        log::trace!("wrote row {}", self.rows);
        Ok(())
    }
}
