//! ICU stays table loader.
//!
//! Parses `ICUSTAYS.csv`.

use std::collections::HashSet;
use std::path::Path;

use csv::StringRecord;
use mimic_types::{Stay, SubjectId};

use crate::parser::{field, parse, CsvTable, MimicRecord};
use crate::types::MimicResult;

/// Columns read from the stays table.
const STAY_COLUMNS: &[&str] = &["SUBJECT_ID", "HADM_ID", "ICUSTAY_ID", "INTIME", "OUTTIME"];

impl MimicRecord for Stay {
    const EXPECTED_COLUMNS: &'static [&'static str] = STAY_COLUMNS;

    fn from_record(record: &StringRecord, columns: &[usize]) -> MimicResult<Self> {
        Ok(Stay {
            subject_id: parse::integer("SUBJECT_ID", field(record, columns[0]))?,
            hadm_id: parse::integer("HADM_ID", field(record, columns[1]))?,
            icustay_id: parse::integer("ICUSTAY_ID", field(record, columns[2]))?,
            intime: parse::timestamp("INTIME", field(record, columns[3]))?,
            outtime: parse::timestamp("OUTTIME", field(record, columns[4]))?,
        })
    }
}

/// The ICU stays table: the raw records plus their typed view.
///
/// `stays[i]` is parsed from `table.records()[i]`.
#[derive(Debug, Clone)]
pub struct StaysTable {
    table: CsvTable,
    stays: Vec<Stay>,
}

impl StaysTable {
    /// Wraps a loaded table, typing every row.
    ///
    /// Fails if any identifier is non-numeric or any timestamp is malformed.
    pub fn from_table(table: CsvTable) -> MimicResult<Self> {
        let stays = table.parse_rows()?;
        Ok(Self { table, stays })
    }

    /// Returns the raw table, for unmodified re-emission.
    pub fn table(&self) -> &CsvTable {
        &self.table
    }

    /// Returns the typed stays in file order.
    pub fn stays(&self) -> &[Stay] {
        &self.stays
    }

    /// Returns the number of stays.
    pub fn len(&self) -> usize {
        self.stays.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.stays.is_empty()
    }

    /// Returns the distinct subject identifiers, in first-appearance order.
    pub fn unique_subjects(&self) -> Vec<SubjectId> {
        let mut seen = HashSet::new();
        self.stays
            .iter()
            .map(|stay| stay.subject_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Returns the number of distinct `(ICUSTAY_ID, HADM_ID, SUBJECT_ID)` values.
    pub fn unique_counts(&self) -> (usize, usize, usize) {
        let icustays: HashSet<_> = self.stays.iter().map(|s| s.icustay_id).collect();
        let hadms: HashSet<_> = self.stays.iter().map(|s| s.hadm_id).collect();
        let subjects: HashSet<_> = self.stays.iter().map(|s| s.subject_id).collect();
        (icustays.len(), hadms.len(), subjects.len())
    }
}

/// Loads `ICUSTAYS.csv` and converts `INTIME`/`OUTTIME` to timestamps.
pub fn read_icustays_table<P: AsRef<Path>>(path: P) -> MimicResult<StaysTable> {
    let table = CsvTable::load(path, STAY_COLUMNS)?;
    StaysTable::from_table(table)
}
