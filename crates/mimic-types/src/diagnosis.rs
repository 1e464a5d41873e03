//! Diagnosis types.
//!
//! `IcdCode` rows come from `D_ICD_DIAGNOSES.csv`, `DiagnosisCode` is a row
//! of `DIAGNOSES_ICD.csv` joined with its code description, and
//! `FilteredDiagnosis` is that row attributed to one ICU stay.

use crate::{HadmId, IcustayId, SubjectId};

/// An ICD-9 code description from `D_ICD_DIAGNOSES.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub struct IcdCode {
    /// ICD-9 diagnosis code, without the decimal point (e.g. `"40301"`).
    pub icd9_code: String,
    /// Abbreviated title.
    pub short_title: String,
    /// Full title.
    pub long_title: String,
}

/// A coded diagnosis attached to a hospital admission.
///
/// Produced by inner-joining `DIAGNOSES_ICD` with `D_ICD_DIAGNOSES` on the
/// code; diagnoses whose code has no description never become a
/// `DiagnosisCode`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub struct DiagnosisCode {
    /// Patient identifier.
    pub subject_id: SubjectId,
    /// Hospital admission identifier.
    pub hadm_id: HadmId,
    /// Priority of the diagnosis within the admission (1 = primary).
    pub seq_num: i32,
    /// ICD-9 diagnosis code.
    pub icd9_code: String,
    /// Abbreviated title of the code.
    pub short_title: String,
    /// Full title of the code.
    pub long_title: String,
}

impl DiagnosisCode {
    /// Attributes this diagnosis to an ICU stay of the same admission.
    pub fn with_stay(&self, icustay_id: IcustayId) -> FilteredDiagnosis {
        FilteredDiagnosis {
            subject_id: self.subject_id,
            hadm_id: self.hadm_id,
            seq_num: self.seq_num,
            icd9_code: self.icd9_code.clone(),
            short_title: self.short_title.clone(),
            long_title: self.long_title.clone(),
            icustay_id,
        }
    }
}

/// A diagnosis restricted to admissions that have at least one ICU stay.
///
/// An admission with several ICU stays yields one `FilteredDiagnosis` per
/// stay for each of its diagnoses.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub struct FilteredDiagnosis {
    /// Patient identifier.
    pub subject_id: SubjectId,
    /// Hospital admission identifier.
    pub hadm_id: HadmId,
    /// Priority of the diagnosis within the admission.
    pub seq_num: i32,
    /// ICD-9 diagnosis code.
    pub icd9_code: String,
    /// Abbreviated title of the code.
    pub short_title: String,
    /// Full title of the code.
    pub long_title: String,
    /// ICU stay this diagnosis is attributed to.
    pub icustay_id: IcustayId,
}

impl FilteredDiagnosis {
    /// Column order of `all_diagnoses.csv`.
    pub const COLUMNS: [&'static str; 7] = [
        "SUBJECT_ID",
        "HADM_ID",
        "SEQ_NUM",
        "ICD9_CODE",
        "SHORT_TITLE",
        "LONG_TITLE",
        "ICUSTAY_ID",
    ];
}

/// Number of ICU-stay occurrences of one ICD-9 code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub struct DiagnosisCount {
    /// ICD-9 diagnosis code (the index column of `diagnosis_counts.csv`).
    pub icd9_code: String,
    /// Abbreviated title of the code.
    pub short_title: String,
    /// Full title of the code.
    pub long_title: String,
    /// Number of filtered diagnosis rows carrying this code.
    pub count: usize,
}

impl DiagnosisCount {
    /// Column order of `diagnosis_counts.csv`.
    pub const COLUMNS: [&'static str; 4] = ["ICD9_CODE", "SHORT_TITLE", "LONG_TITLE", "COUNT"];
}
