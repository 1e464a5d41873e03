//! CSV output writers.
//!
//! [`PartitionedWriter`] appends event rows to `events.csv` in contiguous
//! per-subject blocks. The remaining helpers write the small reference
//! outputs in one go.

use std::fs::{File, OpenOptions};
use std::mem;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use mimic_types::{DiagnosisCount, EventRow, FilteredDiagnosis};
use serde::Serialize;
use tracing::trace;

use crate::parser::CsvTable;
use crate::types::MimicResult;

/// The in-flight rows of the current partition (one subject).
///
/// Every buffered row carries the buffer's key.
#[derive(Debug, Default)]
pub struct PartitionBuffer {
    key: Option<String>,
    rows: Vec<EventRow>,
}

impl PartitionBuffer {
    /// Creates an empty buffer with no key.
    pub fn new() -> Self {
        Self::default()
    }

    /// The subject of the buffered rows, once any row has been seen.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Number of buffered rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows are buffered.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if `row` starts a new partition.
    pub fn is_boundary(&self, row: &EventRow) -> bool {
        matches!(self.key, Some(ref key) if *key != row.subject_id)
    }

    /// Buffers `row` and makes its subject the current key.
    ///
    /// Callers flush first when [`is_boundary`](Self::is_boundary) holds.
    pub fn push(&mut self, row: EventRow) {
        if self.key.as_deref() != Some(row.subject_id.as_str()) {
            self.key = Some(row.subject_id.clone());
        }
        self.rows.push(row);
    }

    fn take_rows(&mut self) -> Vec<EventRow> {
        mem::take(&mut self.rows)
    }
}

/// Appends the buffered rows to `path` and empties the buffer.
///
/// Creates the file with a header line if it does not exist. The buffer
/// key is kept. Returns the number of rows written.
pub fn flush_partition(path: &Path, buffer: &mut PartitionBuffer) -> MimicResult<usize> {
    let rows = buffer.take_rows();

    if !path.is_file() {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(File::create(path)?);
        writer.write_record(EventRow::COLUMNS)?;
        writer.flush()?;
    }

    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    trace!(subject = ?buffer.key(), rows = rows.len(), "Flushed partition");
    Ok(rows.len())
}

/// Writes event rows to one shared file, grouped by contiguous runs of
/// equal `SUBJECT_ID` in arrival order.
///
/// A subject that reappears after another subject produces a second block;
/// blocks are never merged. Existing files are appended to, never
/// truncated.
#[derive(Debug)]
pub struct PartitionedWriter {
    path: PathBuf,
    buffer: PartitionBuffer,
    rows_written: u64,
    partitions_flushed: u64,
}

impl PartitionedWriter {
    /// Creates a writer appending to `path`. Nothing is written until the
    /// first partition is flushed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            buffer: PartitionBuffer::new(),
            rows_written: 0,
            partitions_flushed: 0,
        }
    }

    /// The output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds a row, flushing the previous partition on a subject change.
    pub fn push(&mut self, row: EventRow) -> MimicResult<()> {
        if self.buffer.is_boundary(&row) {
            self.flush()?;
        }
        self.buffer.push(row);
        Ok(())
    }

    fn flush(&mut self) -> MimicResult<()> {
        let written = flush_partition(&self.path, &mut self.buffer)?;
        self.rows_written += written as u64;
        self.partitions_flushed += 1;
        Ok(())
    }

    /// Flushes the last partition and returns `(rows_written, partitions_flushed)`.
    ///
    /// Does nothing if no row was ever pushed.
    pub fn finish(mut self) -> MimicResult<(u64, u64)> {
        if self.buffer.key().is_some() && !self.buffer.is_empty() {
            self.flush()?;
        }
        Ok((self.rows_written, self.partitions_flushed))
    }
}

/// Writes `records` with a header row, replacing any existing file.
pub fn write_records<P, T>(path: P, records: &[T]) -> MimicResult<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path.as_ref())?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a loaded table back out unmodified.
pub fn write_table<P: AsRef<Path>>(path: P, table: &CsvTable) -> MimicResult<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path.as_ref())?;
    writer.write_record(table.headers())?;
    for record in table.records() {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `all_diagnoses.csv`.
pub fn write_diagnoses<P: AsRef<Path>>(path: P, diagnoses: &[FilteredDiagnosis]) -> MimicResult<()> {
    if diagnoses.is_empty() {
        return write_header_only(path.as_ref(), &FilteredDiagnosis::COLUMNS);
    }
    write_records(path, diagnoses)
}

/// Writes `diagnosis_counts.csv`, keyed by `ICD9_CODE`.
pub fn write_diagnosis_counts<P: AsRef<Path>>(path: P, counts: &[DiagnosisCount]) -> MimicResult<()> {
    if counts.is_empty() {
        return write_header_only(path.as_ref(), &DiagnosisCount::COLUMNS);
    }
    write_records(path, counts)
}

// serde-driven headers are only emitted with the first record
fn write_header_only(path: &Path, columns: &[&str]) -> MimicResult<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(columns)?;
    writer.flush()?;
    Ok(())
}
