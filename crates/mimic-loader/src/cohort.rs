//! Cohort and item allow-lists.
//!
//! Allow-lists are single-column CSV files of integer identifiers. Values
//! are normalised to their canonical decimal form and held in hash sets so
//! that membership is exact: `"12"` never matches `"112"`.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use tracing::warn;

use crate::parser::{field, open_file, parse, reader_builder, resolve_columns};
use crate::types::MimicResult;

/// Reads the identifiers of one column into a set.
///
/// Blank cells are skipped. Non-integer values fail the load.
pub fn read_id_set<P: AsRef<Path>>(path: P, column: &str) -> MimicResult<HashSet<String>> {
    let path = path.as_ref();
    let reader = open_file(path)?;
    read_id_set_from_reader(reader, column, &path.display().to_string())
}

/// Reader-based form of [`read_id_set`].
pub fn read_id_set_from_reader<R: Read>(
    reader: R,
    column: &str,
    source: &str,
) -> MimicResult<HashSet<String>> {
    let mut csv_reader = reader_builder(true).from_reader(reader);
    let index = resolve_columns(csv_reader.headers()?, &[column], source)?[0];

    let mut ids = HashSet::new();
    let mut blanks = 0usize;
    for record in csv_reader.records() {
        let record = record?;
        let value = field(&record, index).trim();
        if value.is_empty() {
            blanks += 1;
            continue;
        }
        let id: u64 = parse::integer(column, value)?;
        ids.insert(id.to_string());
    }

    if blanks > 0 {
        warn!(source, column, blanks, "Ignored blank identifiers");
    }
    Ok(ids)
}

/// The cohort of interest: admissions and subjects whose events are kept.
#[derive(Debug, Clone, Default)]
pub struct CohortFilter {
    hadm_ids: HashSet<String>,
    subject_ids: HashSet<String>,
}

impl CohortFilter {
    /// Creates a cohort from explicit identifier sets.
    pub fn new<I, J, S, T>(hadm_ids: I, subject_ids: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            hadm_ids: hadm_ids.into_iter().map(Into::into).collect(),
            subject_ids: subject_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads the cohort from an admission list (`HADM_ID` column) and a
    /// subject list (`SUBJECT_ID` column).
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(hadm_path: P, subject_path: Q) -> MimicResult<Self> {
        Ok(Self {
            hadm_ids: read_id_set(hadm_path, "HADM_ID")?,
            subject_ids: read_id_set(subject_path, "SUBJECT_ID")?,
        })
    }

    /// Returns true if the admission or the subject belongs to the cohort.
    pub fn contains(&self, hadm_id: &str, subject_id: &str) -> bool {
        self.hadm_ids.contains(hadm_id) || self.subject_ids.contains(subject_id)
    }

    /// Number of cohort admissions.
    pub fn hadm_count(&self) -> usize {
        self.hadm_ids.len()
    }

    /// Number of cohort subjects.
    pub fn subject_count(&self) -> usize {
        self.subject_ids.len()
    }
}

/// Loads the optional caller item allow-list (`ITEMID` column).
pub fn read_item_ids<P: AsRef<Path>>(path: P) -> MimicResult<HashSet<String>> {
    read_id_set(path, "ITEMID")
}
