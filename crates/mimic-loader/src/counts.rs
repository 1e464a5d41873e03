//! Diagnosis code frequency aggregation.

use std::collections::HashMap;

use mimic_types::{DiagnosisCount, FilteredDiagnosis};

/// Counts ICU-stay occurrences per ICD-9 code.
///
/// Each code takes the titles of its first row. Codes are sorted by count,
/// descending; equal counts keep first-appearance order. Zero counts cannot
/// arise from a non-empty group but are dropped regardless.
pub fn count_icd_codes(diagnoses: &[FilteredDiagnosis]) -> Vec<DiagnosisCount> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<DiagnosisCount> = Vec::new();

    for diagnosis in diagnoses {
        let index = *position
            .entry(diagnosis.icd9_code.as_str())
            .or_insert_with(|| {
                counts.push(DiagnosisCount {
                    icd9_code: diagnosis.icd9_code.clone(),
                    short_title: diagnosis.short_title.clone(),
                    long_title: diagnosis.long_title.clone(),
                    count: 0,
                });
                counts.len() - 1
            });
        counts[index].count += 1;
    }

    counts.retain(|code| code.count > 0);
    // stable: ties stay in first-appearance order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
