//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use mimic_loader::ExtractConfig;
use mimic_types::EventTable;

/// Extract a cohort subset of MIMIC-III into per-cohort CSV files.
#[derive(Debug, Parser)]
#[command(name = "mimic-extract", version, about)]
pub struct Cli {
    /// MIMIC-III directory.
    pub mimic3_path: PathBuf,

    /// Output path for data.
    pub output_path: PathBuf,

    /// Event tables to extract.
    #[arg(
        short = 'e',
        long = "event_tables",
        num_args = 1..,
        default_values = ["CHARTEVENTS", "LABEVENTS", "OUTPUTEVENTS"]
    )]
    pub event_tables: Vec<EventTable>,

    /// CSV file with an ITEMID column restricting extracted items.
    #[arg(short = 'i', long = "itemids_file", value_name = "CSV")]
    pub itemids_file: Option<PathBuf>,

    /// Cohort admission list (default: <MIMIC3_PATH>/HBV_HADM.csv).
    #[arg(long = "cohort-hadm", value_name = "CSV")]
    pub cohort_hadm: Option<PathBuf>,

    /// Cohort subject list (default: <MIMIC3_PATH>/HBV_SUBJECT.csv).
    #[arg(long = "cohort-subjects", value_name = "CSV")]
    pub cohort_subjects: Option<PathBuf>,

    /// Replace an existing events.csv instead of appending to it.
    #[arg(long)]
    pub overwrite: bool,

    /// Do not draw progress bars.
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Verbosity in output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the extraction config.
    pub fn to_config(&self) -> ExtractConfig {
        ExtractConfig {
            mimic3_path: self.mimic3_path.clone(),
            output_path: self.output_path.clone(),
            event_tables: self.event_tables.clone(),
            itemids_file: self.itemids_file.clone(),
            cohort_hadm_file: self.cohort_hadm.clone(),
            cohort_subject_file: self.cohort_subjects.clone(),
            show_progress: !self.no_progress,
            overwrite_events: self.overwrite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["mimic-extract", "/data/mimic3", "/tmp/out"]).unwrap();
        assert_eq!(cli.event_tables, EventTable::ALL.to_vec());
        assert!(!cli.verbose);

        let config = cli.to_config();
        assert!(config.show_progress);
        assert!(!config.overwrite_events);
        assert!(config.itemids_file.is_none());
    }

    #[test]
    fn test_event_tables_and_items() {
        let cli = Cli::try_parse_from([
            "mimic-extract",
            "/data/mimic3",
            "/tmp/out",
            "-e",
            "labevents",
            "OUTPUTEVENTS",
            "-i",
            "items.csv",
            "-v",
        ])
        .unwrap();
        assert_eq!(
            cli.event_tables,
            vec![EventTable::LabEvents, EventTable::OutputEvents]
        );
        assert_eq!(cli.itemids_file, Some(PathBuf::from("items.csv")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_table_rejected() {
        let result =
            Cli::try_parse_from(["mimic-extract", "/data", "/out", "-e", "NOTEEVENTS"]);
        assert!(result.is_err());
    }
}
