//! JSON-lines results log: one reported sequence per line, as `[3,29,5,7]`.
//!
//! Terms are written as bare decimal integers. The log is observational: for a
//! parallel sweep its line order follows report order, which is not
//! deterministic.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use trott_kernel::cf::term::TermSequence;
use trott_kernel::error::KernelError;
use trott_search::contract::{ResultSink, SinkError};
use trott_search::node::Discovery;

/// A [`ResultSink`] appending one line per discovery to `W`.
#[derive(Debug)]
pub struct ResultsLog<W: Write> {
    writer: W,
    lines: u64,
}

impl ResultsLog<BufWriter<File>> {
    /// Create (or truncate) a log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be created.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        File::create(path).map(|f| Self::new(BufWriter::new(f)))
    }
}

impl<W: Write> ResultsLog<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Lines written so far.
    #[must_use]
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the final flush.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ResultSink for ResultsLog<W> {
    fn report(&mut self, discovery: &Discovery) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", format_line(&discovery.sequence)).map_err(|e| SinkError {
            detail: format!("results log write failed: {e}"),
        })?;
        self.lines += 1;
        Ok(())
    }
}

/// One log line (without the newline).
#[must_use]
pub fn format_line(sequence: &TermSequence) -> String {
    format!("[{sequence}]")
}

/// Parse a log back into sequences, in line order. Blank lines are skipped.
///
/// # Errors
///
/// Returns the [`KernelError`] of the first malformed line.
pub fn parse_results_log(text: &str) -> Result<Vec<TermSequence>, KernelError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::parse)
        .collect()
}
