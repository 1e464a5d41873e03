//! MIMIC-III cohort extraction binary.

use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    let config = cli.to_config();

    fs::create_dir_all(&config.output_path).with_context(|| {
        format!(
            "creating output directory {}",
            config.output_path.display()
        )
    })?;

    tracing::info!("Reading MIMIC-III tables from: {}", config.mimic3_path.display());
    let summary = mimic_loader::run(&config).context("cohort extraction failed")?;

    tracing::info!(
        "Wrote {} stays, {} diagnoses, {} diagnosis codes",
        summary.stays,
        summary.diagnoses,
        summary.diagnosis_codes
    );
    for (table, stats) in &summary.tables {
        tracing::info!(
            "{}: {} of {} rows kept ({:.4}%)",
            table,
            stats.rows_written,
            stats.rows_read,
            stats.retention_rate()
        );
    }

    Ok(())
}
