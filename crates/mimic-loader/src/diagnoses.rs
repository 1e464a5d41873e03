//! Diagnosis loading and joins.
//!
//! Joins `DIAGNOSES_ICD.csv` with `D_ICD_DIAGNOSES.csv` and restricts the
//! result to admissions with an ICU stay.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use mimic_types::{
    DiagnosisCode, FilteredDiagnosis, HadmId, IcdCode, IcustayId, Stay, SubjectId,
};
use tracing::debug;

use crate::parser::{field, parse, MimicRecord, TableParser};
use crate::types::MimicResult;

impl MimicRecord for IcdCode {
    const EXPECTED_COLUMNS: &'static [&'static str] = &["ICD9_CODE", "SHORT_TITLE", "LONG_TITLE"];

    fn from_record(record: &StringRecord, columns: &[usize]) -> MimicResult<Self> {
        Ok(IcdCode {
            icd9_code: field(record, columns[0]).to_string(),
            short_title: field(record, columns[1]).to_string(),
            long_title: field(record, columns[2]).to_string(),
        })
    }
}

/// A `DIAGNOSES_ICD` row before typing.
///
/// Identifiers stay textual until the row survives the code join, so rows
/// dropped by the join are never coerced.
#[derive(Debug, Clone)]
struct RawDiagnosis {
    subject_id: String,
    hadm_id: String,
    seq_num: String,
    icd9_code: String,
}

impl MimicRecord for RawDiagnosis {
    const EXPECTED_COLUMNS: &'static [&'static str] =
        &["SUBJECT_ID", "HADM_ID", "SEQ_NUM", "ICD9_CODE"];

    fn from_record(record: &StringRecord, columns: &[usize]) -> MimicResult<Self> {
        Ok(RawDiagnosis {
            subject_id: field(record, columns[0]).to_string(),
            hadm_id: field(record, columns[1]).to_string(),
            seq_num: field(record, columns[2]).to_string(),
            icd9_code: field(record, columns[3]).to_string(),
        })
    }
}

impl RawDiagnosis {
    fn into_typed(self, code: &IcdCode) -> MimicResult<DiagnosisCode> {
        Ok(DiagnosisCode {
            subject_id: parse::integer("SUBJECT_ID", &self.subject_id)?,
            hadm_id: parse::integer("HADM_ID", &self.hadm_id)?,
            seq_num: parse::integer("SEQ_NUM", &self.seq_num)?,
            icd9_code: self.icd9_code,
            short_title: code.short_title.clone(),
            long_title: code.long_title.clone(),
        })
    }
}

/// Indexes code descriptions by code. The first description of a code wins.
fn index_codes(codes: Vec<IcdCode>) -> HashMap<String, IcdCode> {
    let mut by_code = HashMap::with_capacity(codes.len());
    for code in codes {
        by_code.entry(code.icd9_code.clone()).or_insert(code);
    }
    by_code
}

fn join_codes<I>(diagnoses: I, codes: &HashMap<String, IcdCode>) -> MimicResult<Vec<DiagnosisCode>>
where
    I: Iterator<Item = MimicResult<RawDiagnosis>>,
{
    let mut joined = Vec::new();
    let mut dropped = 0usize;

    for raw in diagnoses {
        let raw = raw?;
        match codes.get(&raw.icd9_code) {
            Some(code) => joined.push(raw.into_typed(code)?),
            None => dropped += 1,
        }
    }

    debug!(
        joined = joined.len(),
        dropped, "Joined diagnoses with ICD-9 code descriptions"
    );
    Ok(joined)
}

/// Loads diagnoses and inner-joins them with their code descriptions.
///
/// Rows whose `ICD9_CODE` has no description are dropped. Fails if any
/// retained row has a non-numeric `SUBJECT_ID`, `HADM_ID` or `SEQ_NUM`.
pub fn load_diagnoses<P: AsRef<Path>, Q: AsRef<Path>>(
    codes_path: P,
    diagnoses_path: Q,
) -> MimicResult<Vec<DiagnosisCode>> {
    let codes = TableParser::<_, IcdCode>::from_path(codes_path)?.parse_all()?;
    let codes = index_codes(codes);
    let diagnoses = TableParser::<_, RawDiagnosis>::from_path(diagnoses_path)?;
    join_codes(diagnoses, &codes)
}

/// Reader-based form of [`load_diagnoses`].
pub fn load_diagnoses_from_readers<R1: Read, R2: Read>(
    codes: R1,
    diagnoses: R2,
) -> MimicResult<Vec<DiagnosisCode>> {
    let codes = TableParser::<_, IcdCode>::from_reader(codes, "D_ICD_DIAGNOSES.csv")?.parse_all()?;
    let codes = index_codes(codes);
    let diagnoses = TableParser::<_, RawDiagnosis>::from_reader(diagnoses, "DIAGNOSES_ICD.csv")?;
    join_codes(diagnoses, &codes)
}

/// Inner-joins diagnoses with the de-duplicated stay triples on
/// `(SUBJECT_ID, HADM_ID)`.
///
/// A diagnosis of an admission with several ICU stays is emitted once per
/// stay. Output follows diagnosis order, then stay order.
pub fn filter_on_stays(diagnoses: &[DiagnosisCode], stays: &[Stay]) -> Vec<FilteredDiagnosis> {
    let mut seen = HashSet::new();
    let mut stays_by_admission: HashMap<(SubjectId, HadmId), Vec<IcustayId>> = HashMap::new();

    for stay in stays {
        if seen.insert(stay.stay_key()) {
            stays_by_admission
                .entry(stay.admission_key())
                .or_default()
                .push(stay.icustay_id);
        }
    }

    diagnoses
        .iter()
        .flat_map(|diagnosis| {
            stays_by_admission
                .get(&(diagnosis.subject_id, diagnosis.hadm_id))
                .into_iter()
                .flatten()
                .map(move |&icustay_id| diagnosis.with_stay(icustay_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MimicError;

    const CODES: &str = "\
ROW_ID,ICD9_CODE,SHORT_TITLE,LONG_TITLE
174,01166,TB pneumonia-oth test,\"Tuberculous pneumonia [any form], tubercle bacilli not found\"
3295,4019,Hypertension NOS,Unspecified essential hypertension
4304,5715,Cirrhosis of liver NOS,Cirrhosis of liver without mention of alcohol
";

    const DIAGNOSES: &str = "\
ROW_ID,SUBJECT_ID,HADM_ID,SEQ_NUM,ICD9_CODE
1,109,172335,1,4019
2,109,172335,2,99999
3,112,174105,1,5715
4,113,109085,1,4019
";

    fn stay(subject_id: SubjectId, hadm_id: HadmId, icustay_id: IcustayId) -> Stay {
        Stay {
            subject_id,
            hadm_id,
            icustay_id,
            intime: None,
            outtime: None,
        }
    }

    #[test]
    fn test_unmatched_codes_are_dropped() {
        let diagnoses =
            load_diagnoses_from_readers(CODES.as_bytes(), DIAGNOSES.as_bytes()).unwrap();
        assert_eq!(diagnoses.len(), 3);
        assert!(diagnoses.iter().all(|d| d.icd9_code != "99999"));
        assert_eq!(diagnoses[0].short_title, "Hypertension NOS");
        assert_eq!(diagnoses[1].long_title, "Cirrhosis of liver without mention of alcohol");
    }

    #[test]
    fn test_non_numeric_identifier_fails() {
        let diagnoses = "SUBJECT_ID,HADM_ID,SEQ_NUM,ICD9_CODE\n109,172335,,4019\n";
        let err = load_diagnoses_from_readers(CODES.as_bytes(), diagnoses.as_bytes()).unwrap_err();
        assert!(matches!(err, MimicError::InvalidInteger { ref column, .. } if column == "SEQ_NUM"));
    }

    #[test]
    fn test_dropped_rows_are_not_coerced() {
        let diagnoses = "SUBJECT_ID,HADM_ID,SEQ_NUM,ICD9_CODE\n109,172335,,V0000\n";
        let joined =
            load_diagnoses_from_readers(CODES.as_bytes(), diagnoses.as_bytes()).unwrap();
        assert!(joined.is_empty());
    }

    #[test]
    fn test_filter_on_stays() {
        let diagnoses =
            load_diagnoses_from_readers(CODES.as_bytes(), DIAGNOSES.as_bytes()).unwrap();
        let stays = vec![stay(109, 172335, 1001), stay(113, 109085, 1003)];

        let filtered = filter_on_stays(&diagnoses, &stays);
        assert_eq!(filtered.len(), 2);
        for row in &filtered {
            assert!(stays
                .iter()
                .any(|s| s.admission_key() == (row.subject_id, row.hadm_id)));
        }
        assert_eq!(filtered[0].icustay_id, 1001);
        assert_eq!(filtered[1].icustay_id, 1003);
    }

    #[test]
    fn test_filter_fans_out_over_stays() {
        let diagnoses =
            load_diagnoses_from_readers(CODES.as_bytes(), DIAGNOSES.as_bytes()).unwrap();
        // Two stays in one admission plus a duplicate stay row.
        let stays = vec![
            stay(109, 172335, 1001),
            stay(109, 172335, 1002),
            stay(109, 172335, 1001),
        ];

        let filtered = filter_on_stays(&diagnoses, &stays);
        let ids: Vec<_> = filtered.iter().map(|d| d.icustay_id).collect();
        assert_eq!(ids, vec![1001, 1002]);
    }
}
