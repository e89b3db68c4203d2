use std::path::PathBuf;

use anyhow::{Context, Result};
use arcjet_core::io::{load_or_derive, sidecar_path, FrameSource, ImageSequence};
use arcjet_core::pipeline::derive_metadata;
use arcjet_core::toi::{ThresholdClassifier, ToiConfig};
use clap::Args;

use crate::progress::IndicatifReporter;
use crate::summary::print_source_info;

#[derive(Args)]
pub struct InfoArgs {
    /// Directory of frame images
    pub input: PathBuf,

    /// Sample every Nth frame when deriving the brightness signal
    #[arg(long, default_value = "10")]
    pub stride: usize,

    /// Discard any cached metadata and derive it again
    #[arg(long)]
    pub refresh: bool,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = ImageSequence::open(&args.input)
        .with_context(|| format!("Failed to open frames in {}", args.input.display()))?;
    let info = source.info()?;

    let sidecar = sidecar_path(&args.input);
    if args.refresh && sidecar.exists() {
        std::fs::remove_file(&sidecar)
            .with_context(|| format!("Failed to remove {}", sidecar.display()))?;
    }

    let meta = load_or_derive(&args.input, || {
        let toi_config = ToiConfig {
            stride: args.stride,
            ..ToiConfig::default()
        };
        derive_metadata(
            &source,
            &toi_config,
            &ThresholdClassifier::default(),
            &IndicatifReporter::new(),
        )
    })
    .context("Failed to load or derive video metadata")?;

    print_source_info(&info, &meta, &sidecar);
    Ok(())
}
