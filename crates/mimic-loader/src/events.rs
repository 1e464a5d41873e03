//! Streaming event table filter.
//!
//! Reads `CHARTEVENTS`, `LABEVENTS` or `OUTPUTEVENTS` row by row, keeping
//! rows of cohort admissions/subjects whose item is on the fixed clinical
//! allow-list. Only the current record is held in memory.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{Reader, StringRecord};
use indicatif::ProgressBar;
use mimic_types::{well_known, EventRow, EventTable};

use crate::cohort::CohortFilter;
use crate::parser::{field, find_column, open_file, reader_builder, resolve_columns};
use crate::types::MimicResult;

/// Rows read between progress bar updates.
const PROGRESS_INTERVAL: u64 = 65_536;

/// Columns that every event table must carry.
const REQUIRED_COLUMNS: &[&str] = &["SUBJECT_ID", "CHARTTIME", "ITEMID", "VALUE", "VALUEUOM"];

/// Column positions of one event table.
#[derive(Debug, Clone, Copy)]
struct EventColumns {
    subject_id: usize,
    charttime: usize,
    itemid: usize,
    value: usize,
    valueuom: usize,
    hadm_id: Option<usize>,
    icustay_id: Option<usize>,
}

impl EventColumns {
    fn resolve(headers: &StringRecord, source: &str) -> MimicResult<Self> {
        let required = resolve_columns(headers, REQUIRED_COLUMNS, source)?;
        Ok(Self {
            subject_id: required[0],
            charttime: required[1],
            itemid: required[2],
            value: required[3],
            valueuom: required[4],
            hadm_id: find_column(headers, "HADM_ID"),
            icustay_id: find_column(headers, "ICUSTAY_ID"),
        })
    }
}

fn optional_field(record: &StringRecord, index: Option<usize>) -> &str {
    index.map_or("", |i| field(record, i))
}

/// A lazy, single-pass sequence of baseline-filtered [`EventRow`]s.
///
/// A row is yielded when its `HADM_ID` or `SUBJECT_ID` is in the cohort
/// and its `ITEMID` is a fixed clinical item. All other rows are skipped
/// without side effect. Tables without `HADM_ID` or `ICUSTAY_ID` columns
/// read those fields as empty strings.
pub struct EventReader<'a, R: Read> {
    reader: Reader<R>,
    record: StringRecord,
    columns: EventColumns,
    cohort: &'a CohortFilter,
    table: EventTable,
    rows_read: u64,
    rows_retained: u64,
    progress: ProgressBar,
}

impl<'a> EventReader<'a, BufReader<File>> {
    /// Opens an event table file.
    ///
    /// # Errors
    /// Returns an error if the file is missing or lacks a required column.
    pub fn open<P: AsRef<Path>>(
        path: P,
        table: EventTable,
        cohort: &'a CohortFilter,
    ) -> MimicResult<Self> {
        let path = path.as_ref();
        let reader = open_file(path)?;
        Self::from_reader(reader, table, cohort, &path.display().to_string())
    }
}

impl<'a, R: Read> EventReader<'a, R> {
    /// Creates a reader over any CSV source.
    pub fn from_reader(
        reader: R,
        table: EventTable,
        cohort: &'a CohortFilter,
        source: &str,
    ) -> MimicResult<Self> {
        let mut csv_reader = reader_builder(true).from_reader(reader);
        let columns = EventColumns::resolve(csv_reader.headers()?, source)?;

        Ok(Self {
            reader: csv_reader,
            record: StringRecord::new(),
            columns,
            cohort,
            table,
            rows_read: 0,
            rows_retained: 0,
            progress: ProgressBar::hidden(),
        })
    }

    /// Reports rows read to `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// The table being read.
    pub fn table(&self) -> EventTable {
        self.table
    }

    /// Data rows read so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Rows yielded so far.
    pub fn rows_retained(&self) -> u64 {
        self.rows_retained
    }

    fn passes_baseline(&self) -> bool {
        let record = &self.record;
        let hadm_id = optional_field(record, self.columns.hadm_id);
        let subject_id = field(record, self.columns.subject_id);

        self.cohort.contains(hadm_id, subject_id)
            && well_known::is_clinical_item(field(record, self.columns.itemid))
    }

    fn current_row(&self) -> EventRow {
        let record = &self.record;
        let columns = &self.columns;
        EventRow {
            subject_id: field(record, columns.subject_id).to_string(),
            hadm_id: optional_field(record, columns.hadm_id).to_string(),
            icustay_id: optional_field(record, columns.icustay_id).to_string(),
            charttime: field(record, columns.charttime).to_string(),
            itemid: field(record, columns.itemid).to_string(),
            value: field(record, columns.value).to_string(),
            valueuom: field(record, columns.valueuom).to_string(),
        }
    }
}

impl<R: Read> Iterator for EventReader<'_, R> {
    type Item = MimicResult<EventRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(true) => {
                    self.rows_read += 1;
                    if self.rows_read % PROGRESS_INTERVAL == 0 {
                        self.progress.set_position(self.rows_read);
                    }

                    if self.passes_baseline() {
                        self.rows_retained += 1;
                        return Some(Ok(self.current_row()));
                    }
                }
                Ok(false) => {
                    self.progress.set_position(self.rows_read);
                    return None;
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Per-invocation item and subject allow-lists applied after the baseline
/// filter. An unset list accepts everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    items: Option<HashSet<String>>,
    subjects: Option<HashSet<String>>,
}

impl EventFilter {
    /// Creates a filter that accepts every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts rows to the given item codes.
    pub fn with_items(mut self, items: HashSet<String>) -> Self {
        self.items = Some(items);
        self
    }

    /// Restricts rows to the given subjects.
    pub fn with_subjects(mut self, subjects: HashSet<String>) -> Self {
        self.subjects = Some(subjects);
        self
    }

    /// Returns true if `row` passes both allow-lists.
    pub fn accepts(&self, row: &EventRow) -> bool {
        if let Some(ref subjects) = self.subjects {
            if !subjects.contains(&row.subject_id) {
                return false;
            }
        }
        if let Some(ref items) = self.items {
            if !items.contains(&row.itemid) {
                return false;
            }
        }
        true
    }
}
