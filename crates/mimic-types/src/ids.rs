//! MIMIC-III identifier types.
//!
//! Identifiers are non-negative integers in every MIMIC-III table. They are
//! kept as plain aliases so joins and hash keys stay cheap.

/// Patient identifier (`SUBJECT_ID`).
pub type SubjectId = u64;

/// Hospital admission identifier (`HADM_ID`).
///
/// One admission may contain several ICU stays.
pub type HadmId = u64;

/// ICU stay identifier (`ICUSTAY_ID`).
pub type IcustayId = u64;
