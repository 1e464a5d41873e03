//! # mimic-types
//!
//! Type definitions for the MIMIC-III critical care database tables used by
//! cohort extraction: ICU stays, coded diagnoses, diagnosis counts and the
//! time-series event rows of the chart, lab and output event tables.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Field names map to the upper case MIMIC-III column names
//!   (`SUBJECT_ID`, `HADM_ID`, ...).
//!
//! ## Usage
//!
//! ```rust
//! use mimic_types::{EventRow, EventTable};
//! use mimic_types::well_known;
//!
//! let table: EventTable = "labevents".parse().unwrap();
//! assert_eq!(table.file_name(), "LABEVENTS.csv");
//!
//! // AST (CareVue chart item 770) is on the fixed allow-list, item 211 is not
//! assert!(well_known::is_clinical_item("770"));
//! assert!(!well_known::is_clinical_item("211"));
//! assert_eq!(EventRow::COLUMNS.len(), 7);
//! ```

#![warn(missing_docs)]

mod diagnosis;
mod event;
mod ids;
mod stay;
pub mod well_known;

// Re-export all public types at crate root
pub use diagnosis::{DiagnosisCode, DiagnosisCount, FilteredDiagnosis, IcdCode};
pub use event::{EventRow, EventTable, ParseEventTableError};
pub use ids::{HadmId, IcustayId, SubjectId};
pub use stay::Stay;
