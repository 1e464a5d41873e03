//! Cohort extraction pipeline.
//!
//! Runs the reference-table stage (stays, diagnoses, counts) and then
//! streams each requested event table into `events.csv`, one table at a
//! time. Every input is opened before streaming begins, so a missing file
//! or a bad reference table aborts the run before the expensive phase.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use mimic_types::EventTable;
use tracing::{debug, info};

use crate::cohort::{read_item_ids, CohortFilter};
use crate::counts::count_icd_codes;
use crate::diagnoses::{filter_on_stays, load_diagnoses};
use crate::events::{EventFilter, EventReader};
use crate::loader::{discover_mimic_files, file_size, format_bytes};
use crate::progress::scan_progress_bar;
use crate::stays::read_icustays_table;
use crate::types::{
    outputs, ExtractConfig, ExtractSummary, MimicError, MimicResult, StreamStats, DIAGNOSES_FILE,
    ICD_CODES_FILE, ICUSTAYS_FILE,
};
use crate::writer::{write_diagnoses, write_diagnosis_counts, write_table, PartitionedWriter};

/// Streams one event table into `output`, applying the cohort baseline
/// filter and then the caller's `filter`.
///
/// Rows are appended to `output` in contiguous per-subject blocks.
pub fn read_events_table(
    path: &Path,
    table: EventTable,
    cohort: &CohortFilter,
    filter: &EventFilter,
    output: &Path,
    show_progress: bool,
) -> MimicResult<StreamStats> {
    info!(
        "Streaming {} ({})",
        path.display(),
        format_bytes(file_size(path))
    );

    let progress = scan_progress_bar(table, show_progress);
    let mut reader = EventReader::open(path, table, cohort)?.with_progress(progress.clone());
    let mut writer = PartitionedWriter::new(output);

    for row in reader.by_ref() {
        let row = row?;
        if !filter.accepts(&row) {
            continue;
        }
        writer.push(row)?;
    }

    let (rows_written, partitions_flushed) = writer.finish()?;
    progress.finish_and_clear();

    let stats = StreamStats {
        rows_read: reader.rows_read(),
        baseline_rows: reader.rows_retained(),
        rows_written,
        partitions_flushed,
    };
    info!(
        table = %table,
        rows_read = stats.rows_read,
        baseline_rows = stats.baseline_rows,
        rows_written = stats.rows_written,
        partitions = stats.partitions_flushed,
        "Finished event table"
    );
    Ok(stats)
}

/// Runs a complete extraction into `config.output_path`.
///
/// The output directory must exist. `events.csv` is appended to unless
/// `config.overwrite_events` is set, so re-running without it duplicates
/// every event row.
pub fn run(config: &ExtractConfig) -> MimicResult<ExtractSummary> {
    let files = discover_mimic_files(&config.mimic3_path, &config.event_tables)?;
    let missing = |name: &str| MimicError::FileNotFound {
        path: config.mimic3_path.join(name).display().to_string(),
    };

    let cohort = CohortFilter::load(config.cohort_hadm_path(), config.cohort_subject_path())?;
    debug!(
        admissions = cohort.hadm_count(),
        subjects = cohort.subject_count(),
        "Loaded cohort allow-lists"
    );

    let item_ids = match config.itemids_file {
        Some(ref path) => Some(read_item_ids(path)?),
        None => None,
    };

    let stays_path = files
        .icustays_file
        .as_ref()
        .ok_or_else(|| missing(ICUSTAYS_FILE))?;
    let stays = read_icustays_table(stays_path)?;
    let (icustays, hadms, subjects) = stays.unique_counts();
    debug!(
        icustay_ids = icustays,
        hadm_ids = hadms,
        subject_ids = subjects,
        "Loaded ICU stays"
    );
    write_table(config.output_path.join(outputs::ALL_STAYS), stays.table())?;

    let codes_path = files
        .icd_codes_file
        .as_ref()
        .ok_or_else(|| missing(ICD_CODES_FILE))?;
    let diagnoses_path = files
        .diagnoses_file
        .as_ref()
        .ok_or_else(|| missing(DIAGNOSES_FILE))?;
    let diagnoses = load_diagnoses(codes_path, diagnoses_path)?;
    let diagnoses = filter_on_stays(&diagnoses, stays.stays());
    write_diagnoses(config.output_path.join(outputs::ALL_DIAGNOSES), &diagnoses)?;

    let counts = count_icd_codes(&diagnoses);
    write_diagnosis_counts(config.output_path.join(outputs::DIAGNOSIS_COUNTS), &counts)?;
    info!(
        stays = stays.len(),
        diagnoses = diagnoses.len(),
        codes = counts.len(),
        "Wrote reference outputs"
    );

    let subject_ids: HashSet<String> = stays
        .unique_subjects()
        .into_iter()
        .map(|id| id.to_string())
        .collect();
    let mut filter = EventFilter::new().with_subjects(subject_ids);
    if let Some(items) = item_ids {
        filter = filter.with_items(items);
    }

    let events_path = config.output_path.join(outputs::EVENTS);
    if config.overwrite_events && events_path.is_file() {
        info!("Removing existing {}", events_path.display());
        fs::remove_file(&events_path)?;
    }

    let mut summary = ExtractSummary {
        stays: stays.len(),
        diagnoses: diagnoses.len(),
        diagnosis_codes: counts.len(),
        tables: Vec::with_capacity(files.event_files.len()),
    };

    for (table, path) in &files.event_files {
        let stats = read_events_table(
            path,
            *table,
            &cohort,
            &filter,
            &events_path,
            config.show_progress,
        )?;
        summary.tables.push((*table, stats));
    }

    Ok(summary)
}
