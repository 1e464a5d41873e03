//! Loader-specific types for MIMIC-III table processing.

use std::path::PathBuf;

use mimic_types::EventTable;
use thiserror::Error;

/// Errors that can occur while loading or extracting MIMIC-III tables.
#[derive(Error, Debug)]
pub enum MimicError {
    /// I/O error reading or writing a table.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required input file is missing.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The MIMIC-III root directory is missing.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A declared column is absent from a table header.
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn {
        /// The name of the missing column.
        column: String,
        /// The file whose header lacks the column.
        path: String,
    },

    /// A value that must be an integer is not.
    #[error("Invalid integer in column {column}: '{value}'")]
    InvalidInteger {
        /// The column holding the value.
        column: String,
        /// The invalid value.
        value: String,
    },

    /// A value that must be a date-time is not.
    #[error("Invalid timestamp in column {column}: '{value}'")]
    InvalidTimestamp {
        /// The column holding the value.
        column: String,
        /// The invalid value.
        value: String,
    },

    /// A table name outside the event tables was requested.
    #[error("Unknown event table: {name}")]
    UnknownEventTable {
        /// The unrecognised name.
        name: String,
    },
}

/// Result type for MIMIC-III operations.
pub type MimicResult<T> = Result<T, MimicError>;

impl From<mimic_types::ParseEventTableError> for MimicError {
    fn from(err: mimic_types::ParseEventTableError) -> Self {
        MimicError::UnknownEventTable { name: err.name }
    }
}

/// Configuration for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Directory holding the MIMIC-III CSV files.
    pub mimic3_path: PathBuf,
    /// Directory receiving the output files.
    pub output_path: PathBuf,
    /// Event tables to stream, in order.
    pub event_tables: Vec<EventTable>,
    /// Optional CSV with an `ITEMID` column restricting extracted items.
    pub itemids_file: Option<PathBuf>,
    /// Cohort admission list. Defaults to `<mimic3_path>/HBV_HADM.csv`.
    pub cohort_hadm_file: Option<PathBuf>,
    /// Cohort subject list. Defaults to `<mimic3_path>/HBV_SUBJECT.csv`.
    pub cohort_subject_file: Option<PathBuf>,
    /// Whether to draw a progress bar while streaming.
    pub show_progress: bool,
    /// Remove an existing `events.csv` before streaming instead of appending.
    pub overwrite_events: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            mimic3_path: PathBuf::from("."),
            output_path: PathBuf::from("output"),
            event_tables: EventTable::ALL.to_vec(),
            itemids_file: None,
            cohort_hadm_file: None,
            cohort_subject_file: None,
            show_progress: true,
            overwrite_events: false,
        }
    }
}

impl ExtractConfig {
    /// Creates a config for the given input and output directories.
    pub fn new(mimic3_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            mimic3_path: mimic3_path.into(),
            output_path: output_path.into(),
            ..Default::default()
        }
    }

    /// Path of the cohort admission list.
    pub fn cohort_hadm_path(&self) -> PathBuf {
        self.cohort_hadm_file
            .clone()
            .unwrap_or_else(|| self.mimic3_path.join(COHORT_HADM_FILE))
    }

    /// Path of the cohort subject list.
    pub fn cohort_subject_path(&self) -> PathBuf {
        self.cohort_subject_file
            .clone()
            .unwrap_or_else(|| self.mimic3_path.join(COHORT_SUBJECT_FILE))
    }
}

/// File name of the ICU stays table.
pub const ICUSTAYS_FILE: &str = "ICUSTAYS.csv";
/// File name of the ICD-9 code description table.
pub const ICD_CODES_FILE: &str = "D_ICD_DIAGNOSES.csv";
/// File name of the per-admission diagnoses table.
pub const DIAGNOSES_FILE: &str = "DIAGNOSES_ICD.csv";
/// Default file name of the cohort admission list.
pub const COHORT_HADM_FILE: &str = "HBV_HADM.csv";
/// Default file name of the cohort subject list.
pub const COHORT_SUBJECT_FILE: &str = "HBV_SUBJECT.csv";

/// Output file names.
pub mod outputs {
    /// Unmodified ICU stays table.
    pub const ALL_STAYS: &str = "all_stays.csv";
    /// Joined and stay-filtered diagnoses.
    pub const ALL_DIAGNOSES: &str = "all_diagnoses.csv";
    /// Per-code ICU-stay counts.
    pub const DIAGNOSIS_COUNTS: &str = "diagnosis_counts.csv";
    /// Filtered observations of all streamed event tables.
    pub const EVENTS: &str = "events.csv";
}

/// Statistics from streaming one event table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Data rows read from the source file.
    pub rows_read: u64,
    /// Rows that passed the cohort and clinical code filters.
    pub baseline_rows: u64,
    /// Rows that also passed the caller's item/subject filters and were written.
    pub rows_written: u64,
    /// Number of partition flushes to the output file.
    pub partitions_flushed: u64,
}

impl StreamStats {
    /// Returns the percentage of read rows that were written.
    pub fn retention_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            (self.rows_written as f64 / self.rows_read as f64) * 100.0
        }
    }
}

/// Summary of a complete extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractSummary {
    /// Rows in the ICU stays table.
    pub stays: usize,
    /// Rows written to `all_diagnoses.csv`.
    pub diagnoses: usize,
    /// Distinct codes written to `diagnosis_counts.csv`.
    pub diagnosis_codes: usize,
    /// Per-table streaming statistics, in extraction order.
    pub tables: Vec<(EventTable, StreamStats)>,
}

/// Located MIMIC-III input files.
#[derive(Debug, Clone, Default)]
pub struct MimicFiles {
    /// Path to `ICUSTAYS.csv`.
    pub icustays_file: Option<PathBuf>,
    /// Path to `D_ICD_DIAGNOSES.csv`.
    pub icd_codes_file: Option<PathBuf>,
    /// Path to `DIAGNOSES_ICD.csv`.
    pub diagnoses_file: Option<PathBuf>,
    /// Requested event tables and their paths, in request order.
    pub event_files: Vec<(EventTable, PathBuf)>,
    /// Requested event tables that were not found.
    pub missing_event_files: Vec<EventTable>,
}

impl MimicFiles {
    /// Creates a new empty MimicFiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if every reference table and requested event table is present.
    pub fn has_required_files(&self) -> bool {
        self.missing_files().is_empty()
    }

    /// Returns the file names of missing required files.
    pub fn missing_files(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.icustays_file.is_none() {
            missing.push(ICUSTAYS_FILE);
        }
        if self.icd_codes_file.is_none() {
            missing.push(ICD_CODES_FILE);
        }
        if self.diagnoses_file.is_none() {
            missing.push(DIAGNOSES_FILE);
        }
        missing.extend(self.missing_event_files.iter().map(|table| table.file_name()));
        missing
    }

    /// Returns the path of a requested event table.
    pub fn event_file(&self, table: EventTable) -> Option<&PathBuf> {
        self.event_files
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, path)| path)
    }
}
