//! Event table types.
//!
//! `EventRow` is one observation from `CHARTEVENTS`, `LABEVENTS` or
//! `OUTPUTEVENTS`. Values are kept as the raw strings of the source file:
//! rows are filtered and copied through, never interpreted.

use std::fmt;
use std::str::FromStr;

/// One observation from a large time-series table.
///
/// `hadm_id` and `icustay_id` are empty strings when the source row (or the
/// source table) does not carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub struct EventRow {
    /// Patient identifier; the partition key of `events.csv`.
    pub subject_id: String,
    /// Hospital admission identifier.
    pub hadm_id: String,
    /// ICU stay identifier.
    pub icustay_id: String,
    /// Time the observation was charted.
    pub charttime: String,
    /// Measurement code.
    pub itemid: String,
    /// Observed value.
    pub value: String,
    /// Unit of measure.
    pub valueuom: String,
}

impl EventRow {
    /// Column order of `events.csv`.
    pub const COLUMNS: [&'static str; 7] = [
        "SUBJECT_ID",
        "HADM_ID",
        "ICUSTAY_ID",
        "CHARTTIME",
        "ITEMID",
        "VALUE",
        "VALUEUOM",
    ];
}

/// The large event tables that can be streamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTable {
    /// `CHARTEVENTS.csv`: bedside charted observations.
    ChartEvents,
    /// `LABEVENTS.csv`: laboratory results.
    LabEvents,
    /// `OUTPUTEVENTS.csv`: fluid outputs.
    OutputEvents,
}

impl EventTable {
    /// All event tables in default extraction order.
    pub const ALL: [EventTable; 3] = [
        EventTable::ChartEvents,
        EventTable::LabEvents,
        EventTable::OutputEvents,
    ];

    /// Upper case table name as used in the MIMIC-III distribution.
    pub fn name(self) -> &'static str {
        match self {
            EventTable::ChartEvents => "CHARTEVENTS",
            EventTable::LabEvents => "LABEVENTS",
            EventTable::OutputEvents => "OUTPUTEVENTS",
        }
    }

    /// File name of the table under the MIMIC-III root.
    pub fn file_name(self) -> &'static str {
        match self {
            EventTable::ChartEvents => "CHARTEVENTS.csv",
            EventTable::LabEvents => "LABEVENTS.csv",
            EventTable::OutputEvents => "OUTPUTEVENTS.csv",
        }
    }

    /// Approximate row count of the full MIMIC-III v1.4 table.
    ///
    /// Used only to size progress reporting.
    pub fn expected_rows(self) -> u64 {
        match self {
            EventTable::ChartEvents => 330_712_484,
            EventTable::LabEvents => 27_854_056,
            EventTable::OutputEvents => 4_349_219,
        }
    }
}

impl fmt::Display for EventTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name an event table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEventTableError {
    /// The unrecognised name.
    pub name: String,
}

impl fmt::Display for ParseEventTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown event table '{}' (expected CHARTEVENTS, LABEVENTS or OUTPUTEVENTS)",
            self.name
        )
    }
}

impl std::error::Error for ParseEventTableError {}

impl FromStr for EventTable {
    type Err = ParseEventTableError;

    /// Parses a table name case-insensitively, with or without `.csv`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let stem = trimmed
            .strip_suffix(".csv")
            .or_else(|| trimmed.strip_suffix(".CSV"))
            .unwrap_or(trimmed);

        EventTable::ALL
            .into_iter()
            .find(|table| table.name().eq_ignore_ascii_case(stem))
            .ok_or_else(|| ParseEventTableError {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_table() {
        assert_eq!("CHARTEVENTS".parse(), Ok(EventTable::ChartEvents));
        assert_eq!("labevents".parse(), Ok(EventTable::LabEvents));
        assert_eq!("OutputEvents.csv".parse(), Ok(EventTable::OutputEvents));
        assert!("NOTEEVENTS".parse::<EventTable>().is_err());
    }

    #[test]
    fn test_expected_rows() {
        assert_eq!(EventTable::ChartEvents.expected_rows(), 330_712_484);
        assert_eq!(EventTable::LabEvents.expected_rows(), 27_854_056);
        assert_eq!(EventTable::OutputEvents.expected_rows(), 4_349_219);
    }

    #[test]
    fn test_display() {
        assert_eq!(EventTable::LabEvents.to_string(), "LABEVENTS");
        let err = "foo".parse::<EventTable>().unwrap_err();
        assert!(err.to_string().contains("foo"));
    }
}
