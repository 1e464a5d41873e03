//! # mimic-loader
//!
//! Cohort extraction for the MIMIC-III critical care database.
//!
//! Small reference tables (ICU stays, diagnoses, code descriptions) are
//! loaded into memory and joined; the large event tables are streamed row
//! by row through a fixed clinical-code and cohort filter and written to a
//! single `events.csv` in per-subject blocks. Memory use is bounded by the
//! reference tables, the allow-lists and one subject's buffered rows.
//!
//! ## Example
//!
//! ```ignore
//! use mimic_loader::{run, ExtractConfig};
//! use mimic_types::EventTable;
//!
//! let config = ExtractConfig {
//!     event_tables: vec![EventTable::LabEvents],
//!     ..ExtractConfig::new("/data/mimic3", "/data/cohort")
//! };
//! let summary = run(&config)?;
//! println!("{} diagnoses across {} codes", summary.diagnoses, summary.diagnosis_codes);
//! ```

#![warn(missing_docs)]

pub mod cohort;
pub mod counts;
pub mod diagnoses;
pub mod events;
pub mod loader;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod stays;
pub mod types;
pub mod writer;

pub use cohort::{read_id_set, read_item_ids, CohortFilter};
pub use counts::count_icd_codes;
pub use diagnoses::{filter_on_stays, load_diagnoses};
pub use events::{EventFilter, EventReader};
pub use loader::{discover_mimic_files, format_bytes};
pub use parser::{CsvTable, MimicRecord, TableParser};
pub use pipeline::{read_events_table, run};
pub use stays::{read_icustays_table, StaysTable};
pub use types::{ExtractConfig, ExtractSummary, MimicError, MimicFiles, MimicResult, StreamStats};
pub use writer::{
    flush_partition, write_diagnoses, write_diagnosis_counts, write_table, PartitionBuffer,
    PartitionedWriter,
};

// Re-export mimic-types for convenience
pub use mimic_types;
