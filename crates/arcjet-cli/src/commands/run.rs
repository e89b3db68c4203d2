use std::path::PathBuf;

use anyhow::{Context, Result};
use arcjet_core::io::{export_csv, records_file_name, save_records, ImageSequence};
use arcjet_core::pipeline::{run_analysis_reported, AnalysisConfig};
use arcjet_core::toi::ThresholdClassifier;
use clap::Args;

use crate::progress::IndicatifReporter;
use crate::summary::{
    print_analysis_summary, print_batch_outcome, print_fit_report, print_series_summary,
};

#[derive(Args)]
pub struct RunArgs {
    /// Analysis config file (TOML)
    pub config: PathBuf,

    /// Frame directory, overriding the config's input
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output directory, overriding the config's output_dir
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = AnalysisConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    if let Some(input) = &args.input {
        config.input = Some(input.clone());
    }
    if let Some(dir) = &args.output {
        config.output_dir = Some(dir.clone());
    }
    let input = config
        .input
        .clone()
        .context("No input directory in the config or on the command line")?;

    print_analysis_summary(&config);

    let source = ImageSequence::open(&input)
        .with_context(|| format!("Failed to open frames in {}", input.display()))?;
    let reporter = IndicatifReporter::new();
    let output = run_analysis_reported(
        &config,
        &source,
        None,
        &ThresholdClassifier::default(),
        &reporter,
    )?;

    if let Some(toi) = &output.toi {
        println!("Time of interest: frames {}..={}", toi.first, toi.last);
    }
    print_batch_outcome(&output.outcome);
    print_series_summary(&output.series);
    print_fit_report(&output.fits);

    let out_dir = config.resolved_output_dir();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let last = output.frames.end.saturating_sub(1);
    let records_path = out_dir.join(records_file_name(&config.name, output.frames.start, last));
    save_records(&records_path, &output.outcome.records)
        .with_context(|| format!("Failed to write {}", records_path.display()))?;

    let table_path = out_dir.join(format!("{}.csv", config.name));
    export_csv(&output.series, &table_path)
        .with_context(|| format!("Failed to export {}", table_path.display()))?;

    println!();
    println!("Records saved to {}", records_path.display());
    println!("Table saved to {}", table_path.display());
    Ok(())
}
