//! Generic MIMIC-III CSV table parser.
//!
//! Provides the in-memory [`CsvTable`] used for small reference tables and a
//! streaming [`TableParser`] that converts records one at a time into typed
//! values. Columns are always declared by the caller and looked up by name;
//! no schema is inferred.

use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::types::{MimicError, MimicResult};

/// Trait for types that can be parsed from a MIMIC-III CSV record.
pub trait MimicRecord: Sized {
    /// Columns this record type reads, in the order passed to `from_record`.
    const EXPECTED_COLUMNS: &'static [&'static str];

    /// Parses a record. `columns[i]` is the position of `EXPECTED_COLUMNS[i]`.
    fn from_record(record: &StringRecord, columns: &[usize]) -> MimicResult<Self>;
}

/// Builds the CSV reader configuration shared by all MIMIC-III tables.
///
/// `flexible` allows rows with fewer fields than the header; missing
/// fields then read as empty strings.
pub(crate) fn reader_builder(flexible: bool) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(b',')
        .has_headers(true)
        .flexible(flexible)
        .trim(csv::Trim::None);
    builder
}

/// Opens `path` for buffered reading, mapping a missing file to
/// [`MimicError::FileNotFound`].
pub(crate) fn open_file(path: &Path) -> MimicResult<BufReader<File>> {
    if !path.is_file() {
        return Err(MimicError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(BufReader::new(File::open(path)?))
}

/// Finds a column by name, ignoring a UTF-8 BOM on the first header.
pub(crate) fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == name)
}

/// Resolves every declared column to its position in `headers`.
pub(crate) fn resolve_columns(
    headers: &StringRecord,
    columns: &[&str],
    source: &str,
) -> MimicResult<Vec<usize>> {
    columns
        .iter()
        .map(|column| {
            find_column(headers, column).ok_or_else(|| MimicError::MissingColumn {
                column: column.to_string(),
                path: source.to_string(),
            })
        })
        .collect()
}

/// Returns field `index` of `record`, or `""` when the row is short.
pub(crate) fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

/// A small table held fully in memory.
///
/// Records are kept as read so the table can be written back unmodified.
#[derive(Debug, Clone)]
pub struct CsvTable {
    source: String,
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl CsvTable {
    /// Loads a whole table, checking that the declared columns are present.
    pub fn load<P: AsRef<Path>>(path: P, declared: &[&str]) -> MimicResult<Self> {
        let path = path.as_ref();
        let reader = open_file(path)?;
        Self::from_reader(reader, declared, &path.display().to_string())
    }

    /// Loads a whole table from a reader.
    pub fn from_reader<R: Read>(reader: R, declared: &[&str], source: &str) -> MimicResult<Self> {
        let mut csv_reader = reader_builder(false).from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        resolve_columns(&headers, declared, source)?;

        let records = csv_reader.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: source.to_string(),
            headers,
            records,
        })
    }

    /// Returns the header record.
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Returns all data records in file order.
    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    /// Returns the number of data records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table has no data records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        find_column(&self.headers, name)
    }

    /// Returns the value of `column` in data row `row`.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.records.get(row).map(|record| field(record, index))
    }

    /// Converts every record into `T`, failing on the first bad record.
    pub fn parse_rows<T: MimicRecord>(&self) -> MimicResult<Vec<T>> {
        let columns = resolve_columns(&self.headers, T::EXPECTED_COLUMNS, &self.source)?;
        self.records
            .iter()
            .map(|record| T::from_record(record, &columns))
            .collect()
    }
}

/// A streaming parser for MIMIC-III tables.
///
/// Reads record-by-record so only the current record is held in memory.
pub struct TableParser<R: Read, T: MimicRecord> {
    reader: Reader<R>,
    columns: Vec<usize>,
    records_read: usize,
    _marker: PhantomData<T>,
}

impl<T: MimicRecord> TableParser<BufReader<File>, T> {
    /// Creates a new parser from a file path.
    ///
    /// # Errors
    /// Returns an error if the file is missing or lacks a declared column.
    pub fn from_path<P: AsRef<Path>>(path: P) -> MimicResult<Self> {
        let path = path.as_ref();
        let reader = open_file(path)?;
        Self::from_reader(reader, &path.display().to_string())
    }
}

impl<R: Read, T: MimicRecord> TableParser<R, T> {
    /// Creates a new parser from a reader.
    pub fn from_reader(reader: R, source: &str) -> MimicResult<Self> {
        let mut csv_reader = reader_builder(false).from_reader(reader);
        let columns = resolve_columns(csv_reader.headers()?, T::EXPECTED_COLUMNS, source)?;

        Ok(Self {
            reader: csv_reader,
            columns,
            records_read: 0,
            _marker: PhantomData,
        })
    }

    /// Returns the number of records read so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Parses all records into a Vec, stopping at the first error.
    pub fn parse_all(self) -> MimicResult<Vec<T>> {
        self.collect()
    }
}

impl<R: Read, T: MimicRecord> Iterator for TableParser<R, T> {
    type Item = MimicResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => {
                self.records_read += 1;
                Some(T::from_record(&record, &self.columns))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Helper functions for parsing MIMIC-III field values.
pub mod parse {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{MimicError, MimicResult};

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    /// Parses an integer value.
    pub fn integer<T: std::str::FromStr>(column: &str, value: &str) -> MimicResult<T> {
        value
            .trim()
            .parse::<T>()
            .map_err(|_| MimicError::InvalidInteger {
                column: column.to_string(),
                value: value.to_string(),
            })
    }

    /// Parses a date-time value. A blank value is a missing timestamp.
    ///
    /// Accepts `YYYY-MM-DD HH:MM:SS` (the MIMIC-III format), an ISO 8601
    /// `T` separator, fractional seconds, and bare dates (midnight).
    pub fn timestamp(column: &str, value: &str) -> MimicResult<Option<NaiveDateTime>> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        for format in DATETIME_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Some(parsed));
            }
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Some)
            .ok_or_else(|| MimicError::InvalidTimestamp {
                column: column.to_string(),
                value: value.to_string(),
            })
    }
}
