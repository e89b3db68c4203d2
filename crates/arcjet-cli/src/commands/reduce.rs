use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use arcjet_core::edge::FlowDirection;
use arcjet_core::io::{export_csv, load_records};
use arcjet_core::pipeline::AnalysisConfig;
use arcjet_core::record::ResultRecord;
use arcjet_core::reduce::{reduce, ReductionConfig, TimeSeries, Units};
use clap::Args;

use crate::summary::print_series_summary;

/// Calibration settings shared by `reduce` and `fit`.
#[derive(Args)]
pub struct ReductionArgs {
    /// Records files produced by `process`
    #[arg(required = true)]
    pub records: Vec<PathBuf>,

    /// Analysis config (TOML) supplying reduction settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Physical model diameter
    #[arg(long)]
    pub diameter: Option<f64>,

    /// Units of the diameter: mm or in
    #[arg(long)]
    pub units: Option<Units>,

    /// Camera frame rate in frames per second
    #[arg(long)]
    pub fps: Option<f64>,

    /// Keep every Nth record
    #[arg(long)]
    pub stride: Option<usize>,

    /// Flow direction, for the recession sign
    #[arg(long)]
    pub flow: Option<FlowDirection>,
}

impl ReductionArgs {
    pub fn reduction_config(&self) -> Result<ReductionConfig> {
        let mut config = match &self.config {
            Some(path) => {
                AnalysisConfig::load(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?
                    .reduction
            }
            None => ReductionConfig::default(),
        };
        if let Some(d) = self.diameter {
            config.diameter = Some(d);
        }
        if let Some(units) = self.units {
            config.units = units;
        }
        if let Some(fps) = self.fps {
            config.frame_rate = fps;
        }
        if let Some(stride) = self.stride {
            config.stride = stride;
        }
        if self.flow.is_some() {
            config.flow = self.flow;
        }
        Ok(config)
    }

    /// Every record across the given files, later files winning on index.
    pub fn load_all(&self) -> Result<Vec<ResultRecord>> {
        let mut merged = BTreeMap::new();
        for path in &self.records {
            let records = load_records(path)
                .with_context(|| format!("Failed to load records from {}", path.display()))?;
            merged.extend(records.into_iter().map(|r| (r.index, r)));
        }
        if merged.is_empty() {
            bail!("No records in the given files");
        }
        Ok(merged.into_values().collect())
    }

    pub fn reduce(&self) -> Result<TimeSeries> {
        let config = self.reduction_config()?;
        let records = self.load_all()?;
        Ok(reduce(&records, &config)?)
    }
}

#[derive(Args)]
pub struct ReduceArgs {
    #[command(flatten)]
    pub reduction: ReductionArgs,

    /// Output CSV path (defaults to the first records file with a .csv extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &ReduceArgs) -> Result<()> {
    let series = args.reduction.reduce()?;
    print_series_summary(&series);

    let output = match &args.output {
        Some(path) => path.clone(),
        None => args.reduction.records[0].with_extension("csv"),
    };
    export_csv(&series, &output)
        .with_context(|| format!("Failed to export {}", output.display()))?;
    println!("Table saved to {}", output.display());
    Ok(())
}
