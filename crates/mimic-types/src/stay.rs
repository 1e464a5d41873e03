//! ICU stay type.
//!
//! This module provides the `Stay` struct representing one row of the
//! MIMIC-III `ICUSTAYS` table.

use chrono::{Duration, NaiveDateTime};

use crate::{HadmId, IcustayId, SubjectId};

/// One ICU admission episode from `ICUSTAYS.csv`.
///
/// Only the identifier and timing columns are typed; the remaining columns
/// of the source table are carried by the loader's raw table so the stays
/// file can be re-emitted unmodified.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use mimic_types::Stay;
///
/// let intime = NaiveDate::from_ymd_opt(2101, 10, 20).unwrap().and_hms_opt(19, 10, 11).unwrap();
/// let outtime = NaiveDate::from_ymd_opt(2101, 10, 26).unwrap().and_hms_opt(20, 43, 9).unwrap();
///
/// let stay = Stay {
///     subject_id: 3,
///     hadm_id: 145834,
///     icustay_id: 211552,
///     intime: Some(intime),
///     outtime: Some(outtime),
/// };
///
/// assert_eq!(stay.admission_key(), (3, 145834));
/// assert_eq!(stay.length_of_stay().unwrap().num_days(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub struct Stay {
    /// Patient identifier.
    pub subject_id: SubjectId,
    /// Hospital admission identifier.
    pub hadm_id: HadmId,
    /// ICU stay identifier.
    pub icustay_id: IcustayId,
    /// ICU admission time. `None` when the source cell is blank.
    pub intime: Option<NaiveDateTime>,
    /// ICU discharge time. `None` when the source cell is blank.
    pub outtime: Option<NaiveDateTime>,
}

impl Stay {
    /// Returns the `(SUBJECT_ID, HADM_ID)` pair used to join diagnoses.
    pub fn admission_key(&self) -> (SubjectId, HadmId) {
        (self.subject_id, self.hadm_id)
    }

    /// Returns the `(SUBJECT_ID, HADM_ID, ICUSTAY_ID)` triple.
    pub fn stay_key(&self) -> (SubjectId, HadmId, IcustayId) {
        (self.subject_id, self.hadm_id, self.icustay_id)
    }

    /// Time spent in the ICU, if both timestamps are present.
    pub fn length_of_stay(&self) -> Option<Duration> {
        match (self.intime, self.outtime) {
            (Some(intime), Some(outtime)) => Some(outtime - intime),
            _ => None,
        }
    }
}
