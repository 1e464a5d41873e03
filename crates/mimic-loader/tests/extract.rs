//! End-to-end extraction over a miniature MIMIC-III directory.

use std::fs;
use std::path::{Path, PathBuf};

use mimic_loader::{run, ExtractConfig, MimicError};
use mimic_types::EventTable;
use tempfile::TempDir;

const ICUSTAYS: &str = "\
ROW_ID,SUBJECT_ID,HADM_ID,ICUSTAY_ID,DBSOURCE,FIRST_CAREUNIT,INTIME,OUTTIME,LOS
1,1,100,1000,carevue,MICU,2101-10-20 19:10:11,2101-10-26 20:43:09,6.0646
2,1,100,1001,carevue,MICU,2101-10-27 08:00:00,2101-10-28 08:00:00,1.0
3,2,200,2000,metavision,SICU,2191-03-16 00:29:31,2191-03-17 16:46:31,1.6785
4,3,300,3000,metavision,CCU,2150-01-01 00:00:00,,
";

const D_ICD_DIAGNOSES: &str = "\
ROW_ID,ICD9_CODE,SHORT_TITLE,LONG_TITLE
1,0702,Hpt B acte coma wo dlta,\"Viral hepatitis B with hepatic coma, acute or unspecified, without mention of hepatitis delta\"
2,5715,Cirrhosis of liver NOS,Cirrhosis of liver without mention of alcohol
3,4019,Hypertension NOS,Unspecified essential hypertension
";

const DIAGNOSES_ICD: &str = "\
ROW_ID,SUBJECT_ID,HADM_ID,SEQ_NUM,ICD9_CODE
1,1,100,1,0702
2,1,100,2,5715
3,2,200,1,5715
4,2,201,1,4019
5,3,300,1,V9999
";

const CHARTEVENTS: &str = "\
ROW_ID,SUBJECT_ID,HADM_ID,ICUSTAY_ID,ITEMID,CHARTTIME,STORETIME,CGID,VALUE,VALUENUM,VALUEUOM
1,1,100,1000,772,2101-10-21 04:00:00,,,3.1,3.1,g/dl
2,1,100,1000,211,2101-10-21 04:00:00,,,86,86,BPM
3,1,100,1000,769,2101-10-21 05:00:00,,,45,45,IU/L
4,2,200,2000,770,2191-03-16 06:00:00,,,31,31,IU/L
5,4,400,4000,770,2191-03-16 06:00:00,,,31,31,IU/L
6,11,200,,772,2191-03-16 07:00:00,,,2.9,2.9,g/dl
";

const LABEVENTS: &str = "\
ROW_ID,SUBJECT_ID,HADM_ID,ITEMID,CHARTTIME,VALUE,VALUENUM,VALUEUOM,FLAG
1,3,,50862,2150-01-01 06:00:00,3.4,3.4,g/dL,
2,3,300,50885,2150-01-01 06:00:00,4.2,4.2,mg/dL,abnormal
3,3,300,51301,2150-01-01 06:00:00,9.1,9.1,K/uL,
";

const OUTPUTEVENTS: &str = "\
ROW_ID,SUBJECT_ID,HADM_ID,ICUSTAY_ID,CHARTTIME,ITEMID,VALUE,VALUEUOM
1,2,200,2000,2191-03-16 08:00:00,40055,200,ml
";

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    output: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("create temp dir");
    let root = dir.path().join("mimic3");
    let output = dir.path().join("out");
    fs::create_dir_all(&root).unwrap();
    fs::create_dir_all(&output).unwrap();

    for (name, contents) in [
        ("ICUSTAYS.csv", ICUSTAYS),
        ("D_ICD_DIAGNOSES.csv", D_ICD_DIAGNOSES),
        ("DIAGNOSES_ICD.csv", DIAGNOSES_ICD),
        ("CHARTEVENTS.csv", CHARTEVENTS),
        ("LABEVENTS.csv", LABEVENTS),
        ("OUTPUTEVENTS.csv", OUTPUTEVENTS),
        ("HBV_HADM.csv", "HADM_ID\n100\n200\n"),
        ("HBV_SUBJECT.csv", "SUBJECT_ID\n3\n"),
    ] {
        fs::write(root.join(name), contents).unwrap();
    }

    Fixture {
        _dir: dir,
        root,
        output,
    }
}

fn config(fx: &Fixture) -> ExtractConfig {
    ExtractConfig {
        show_progress: false,
        ..ExtractConfig::new(&fx.root, &fx.output)
    }
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("read output")
        .lines()
        .map(str::to_string)
        .collect()
}

fn column(line: &str, index: usize) -> String {
    line.split(',').nth(index).unwrap_or_default().to_string()
}

#[test]
fn extracts_reference_outputs() {
    let fx = fixture();
    let summary = run(&config(&fx)).expect("run extraction");

    assert_eq!(summary.stays, 4);
    assert_eq!(
        fs::read_to_string(fx.output.join("all_stays.csv")).unwrap(),
        ICUSTAYS
    );

    // 0702 and 5715 fan out over both stays of admission 100; admission 201
    // has no stay and V9999 has no description.
    let diagnoses = lines(&fx.output.join("all_diagnoses.csv"));
    assert_eq!(
        diagnoses[0],
        "SUBJECT_ID,HADM_ID,SEQ_NUM,ICD9_CODE,SHORT_TITLE,LONG_TITLE,ICUSTAY_ID"
    );
    assert_eq!(diagnoses.len(), 1 + 5);
    assert_eq!(summary.diagnoses, 5);
    assert!(diagnoses.iter().all(|l| !l.contains("V9999") && !l.starts_with("2,201,")));

    let counts = lines(&fx.output.join("diagnosis_counts.csv"));
    assert_eq!(counts[0], "ICD9_CODE,SHORT_TITLE,LONG_TITLE,COUNT");
    assert_eq!(counts[1], "5715,Cirrhosis of liver NOS,Cirrhosis of liver without mention of alcohol,3");
    assert!(counts[2].starts_with("0702,") && counts[2].ends_with(",2"));
    assert_eq!(counts.len(), 3);
    assert_eq!(summary.diagnosis_codes, 2);
}

#[test]
fn extracts_filtered_events_in_subject_blocks() {
    let fx = fixture();
    let summary = run(&config(&fx)).expect("run extraction");

    let events = lines(&fx.output.join("events.csv"));
    assert_eq!(
        events[0],
        "SUBJECT_ID,HADM_ID,ICUSTAY_ID,CHARTTIME,ITEMID,VALUE,VALUEUOM"
    );
    assert_eq!(events.iter().filter(|l| l.starts_with("SUBJECT_ID")).count(), 1);

    // Chart: subject 1 (772, 769), subject 2 (770). Subject 4 is outside the
    // cohort, subject 11 is in cohort admission 200 but has no ICU stay.
    // Lab: subject 3 by subject id, 51301 is not a clinical item.
    // Output: item 40055 is not a clinical item.
    let rows: Vec<(String, String)> = events[1..]
        .iter()
        .map(|l| (column(l, 0), column(l, 4)))
        .collect();
    let expected: Vec<(String, String)> = [
        ("1", "772"),
        ("1", "769"),
        ("2", "770"),
        ("3", "50862"),
        ("3", "50885"),
    ]
    .iter()
    .map(|(s, i)| (s.to_string(), i.to_string()))
    .collect();
    assert_eq!(rows, expected);

    // LABEVENTS has no ICUSTAY_ID column.
    assert_eq!(events[4], "3,,,2150-01-01 06:00:00,50862,3.4,g/dL");

    let tables: Vec<_> = summary.tables.iter().map(|(t, _)| *t).collect();
    assert_eq!(tables, EventTable::ALL.to_vec());
    let chart = &summary.tables[0].1;
    assert_eq!(chart.rows_read, 6);
    assert_eq!(chart.baseline_rows, 4);
    assert_eq!(chart.rows_written, 3);
    assert_eq!(chart.partitions_flushed, 2);
    assert_eq!(summary.tables[2].1.rows_written, 0);
}

#[test]
fn item_allow_list_restricts_events() {
    let fx = fixture();
    let items = fx.root.join("items.csv");
    fs::write(&items, "ITEMID,LABEL\n772,Albumin\n50885,Bilirubin\n").unwrap();

    let config = ExtractConfig {
        itemids_file: Some(items),
        event_tables: vec![EventTable::ChartEvents, EventTable::LabEvents],
        ..config(&fx)
    };
    run(&config).expect("run extraction");

    let events = lines(&fx.output.join("events.csv"));
    let items: Vec<_> = events[1..].iter().map(|l| column(l, 4)).collect();
    assert_eq!(items, vec!["772", "50885"]);
}

#[test]
fn rerun_appends_duplicate_events() {
    let fx = fixture();
    let config = ExtractConfig {
        event_tables: vec![EventTable::ChartEvents],
        ..config(&fx)
    };

    run(&config).expect("first run");
    let first = lines(&fx.output.join("events.csv"));
    run(&config).expect("second run");
    let second = lines(&fx.output.join("events.csv"));

    assert_eq!(second.len(), 1 + 2 * (first.len() - 1));
    assert_eq!(second[1..first.len()], first[1..]);
    assert_eq!(second[first.len()..], first[1..]);
}

#[test]
fn overwrite_replaces_events() {
    let fx = fixture();
    let config = ExtractConfig {
        event_tables: vec![EventTable::ChartEvents],
        overwrite_events: true,
        ..config(&fx)
    };

    run(&config).expect("first run");
    let first = lines(&fx.output.join("events.csv"));
    run(&config).expect("second run");
    assert_eq!(lines(&fx.output.join("events.csv")), first);
}

#[test]
fn missing_cohort_file_fails_before_any_output() {
    let fx = fixture();
    fs::remove_file(fx.root.join("HBV_SUBJECT.csv")).unwrap();

    let err = run(&config(&fx)).unwrap_err();
    assert!(matches!(err, MimicError::FileNotFound { .. }));
    assert!(!fx.output.join("all_stays.csv").exists());
    assert!(!fx.output.join("events.csv").exists());
}

#[test]
fn bad_diagnosis_identifier_fails_before_streaming() {
    let fx = fixture();
    fs::write(
        fx.root.join("DIAGNOSES_ICD.csv"),
        "ROW_ID,SUBJECT_ID,HADM_ID,SEQ_NUM,ICD9_CODE\n1,1,100,first,0702\n",
    )
    .unwrap();

    let err = run(&config(&fx)).unwrap_err();
    assert!(matches!(err, MimicError::InvalidInteger { .. }));
    assert!(!fx.output.join("events.csv").exists());
}
