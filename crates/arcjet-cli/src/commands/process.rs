use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use arcjet_core::edge::FlowDirection;
use arcjet_core::frame::CropWindow;
use arcjet_core::io::{
    append_records, load_metadata, records_file_name, sidecar_path, FrameSource, ImageSequence,
};
use arcjet_core::pipeline::{spawn_batch, AnalysisConfig};
use arcjet_core::processor::FrameProcessor;
use arcjet_core::segment::SegmentationMethod;
use clap::Args;
use tracing::debug;

use crate::progress::IndicatifReporter;
use crate::summary::print_batch_outcome;

#[derive(Args)]
pub struct ProcessArgs {
    /// Directory of frame images
    pub input: PathBuf,

    /// Analysis config (TOML) supplying processor settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// First frame to process (defaults to the first good frame)
    #[arg(long)]
    pub first: Option<usize>,

    /// Last frame to process, inclusive (defaults to the last good frame)
    #[arg(long)]
    pub last: Option<usize>,

    /// Segmentation method: AUTO, HSV, GRAY or CNN
    #[arg(long)]
    pub method: Option<SegmentationMethod>,

    /// Intensity threshold for GRAY segmentation
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Flow direction: left, right, up or down
    #[arg(long)]
    pub flow: Option<FlowDirection>,

    /// Crop window as y_min,y_max,x_min,x_max
    #[arg(long)]
    pub crop: Option<CropWindow>,

    /// Directory for the records file (defaults to the input's parent)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Records file stem
    #[arg(long)]
    pub name: Option<String>,
}

pub fn run(args: &ProcessArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    config.input = Some(args.input.clone());
    if let Some(dir) = &args.output {
        config.output_dir = Some(dir.clone());
    }
    if let Some(name) = &args.name {
        config.name = name.clone();
    }
    if let Some(method) = &args.method {
        config.processor.segmentation = method.clone();
    }
    if let Some(threshold) = args.threshold {
        match &mut config.processor.segmentation {
            SegmentationMethod::Gray { threshold: t } => *t = threshold,
            _ => bail!("--threshold only applies to GRAY segmentation"),
        }
    }

    let source = Arc::new(
        ImageSequence::open(&args.input)
            .with_context(|| format!("Failed to open frames in {}", args.input.display()))?,
    );
    let total = source.frame_count();

    let sidecar = sidecar_path(&args.input);
    let meta = if sidecar.exists() {
        debug!(path = %sidecar.display(), "Using cached video metadata");
        Some(load_metadata(&sidecar).with_context(|| format!("Invalid sidecar {}", sidecar.display()))?)
    } else {
        None
    };
    let good = meta.as_ref().and_then(|m| m.good_range());

    config.processor.flow = args
        .flow
        .or(config.processor.flow)
        .or_else(|| meta.as_ref().and_then(|m| m.flow));
    config.processor.crop = args
        .crop
        .or(config.processor.crop)
        .or_else(|| meta.as_ref().and_then(|m| m.crop));

    let first = args
        .first
        .or(config.frames.map(|(f, _)| f))
        .or(good.map(|(f, _)| f))
        .unwrap_or(0);
    let last = args
        .last
        .or(config.frames.map(|(_, l)| l))
        .or(good.map(|(_, l)| l))
        .unwrap_or(total.saturating_sub(1));
    if first > last || last >= total {
        bail!("Frame range {first}..={last} is outside the {total} available frames");
    }

    let processor = FrameProcessor::new(config.processor.clone(), None)?;
    println!(
        "Processing frames {first}..={last} of {} with {}",
        args.input.display(),
        config.processor.segmentation
    );

    let handle = spawn_batch(
        source,
        Arc::new(Mutex::new(processor)),
        first..last + 1,
        Arc::new(IndicatifReporter::new()),
    )?;
    let outcome = handle.join()?;
    print_batch_outcome(&outcome);

    let out_dir = config.resolved_output_dir();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let path = out_dir.join(records_file_name(&config.name, first, last));
    let merged = append_records(&path, &outcome.records)
        .with_context(|| format!("Failed to write records to {}", path.display()))?;
    println!("{} record(s) saved to {}", merged.len(), path.display());

    Ok(())
}
