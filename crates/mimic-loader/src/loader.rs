//! MIMIC-III file discovery.

use std::fs;
use std::path::Path;

use mimic_types::EventTable;

use crate::types::{
    MimicError, MimicFiles, MimicResult, DIAGNOSES_FILE, ICD_CODES_FILE, ICUSTAYS_FILE,
};

/// Locates the reference tables and the requested event tables under a
/// MIMIC-III root directory.
///
/// Files are looked up by exact name. Fails with the first missing file so
/// that nothing is processed when any input is absent.
pub fn discover_mimic_files<P: AsRef<Path>>(path: P, tables: &[EventTable]) -> MimicResult<MimicFiles> {
    let path = path.as_ref();

    if !path.is_dir() {
        return Err(MimicError::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }

    let existing = |name: &str| Some(path.join(name)).filter(|p| p.is_file());

    let mut files = MimicFiles::new();
    files.icustays_file = existing(ICUSTAYS_FILE);
    files.icd_codes_file = existing(ICD_CODES_FILE);
    files.diagnoses_file = existing(DIAGNOSES_FILE);

    for &table in tables {
        match existing(table.file_name()) {
            Some(file) => files.event_files.push((table, file)),
            None => files.missing_event_files.push(table),
        }
    }

    if let Some(first) = files.missing_files().first() {
        return Err(MimicError::FileNotFound {
            path: path.join(first).display().to_string(),
        });
    }

    Ok(files)
}

/// Returns the size of a file, or 0 if it cannot be read.
pub fn file_size<P: AsRef<Path>>(path: P) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Formats a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "SUBJECT_ID\n").unwrap();
    }

    #[test]
    fn test_discover_all_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in [ICUSTAYS_FILE, ICD_CODES_FILE, DIAGNOSES_FILE, "LABEVENTS.csv"] {
            touch(dir.path(), name);
        }

        let files = discover_mimic_files(dir.path(), &[EventTable::LabEvents]).unwrap();
        assert!(files.has_required_files());
        assert_eq!(
            files.event_file(EventTable::LabEvents),
            Some(&dir.path().join("LABEVENTS.csv"))
        );
        assert!(files.event_file(EventTable::ChartEvents).is_none());
    }

    #[test]
    fn test_missing_event_table() {
        let dir = tempfile::tempdir().unwrap();
        for name in [ICUSTAYS_FILE, ICD_CODES_FILE, DIAGNOSES_FILE] {
            touch(dir.path(), name);
        }

        let err = discover_mimic_files(dir.path(), &[EventTable::ChartEvents]).unwrap_err();
        match err {
            MimicError::FileNotFound { path } => assert!(path.ends_with("CHARTEVENTS.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_root() {
        let err = discover_mimic_files("/nonexistent/mimic3", &[]).unwrap_err();
        assert!(matches!(err, MimicError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 bytes");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(35 * 1024 * 1024 * 1024), "35.00 GB");
    }
}
