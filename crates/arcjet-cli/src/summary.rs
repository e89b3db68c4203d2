use std::path::Path;

use arcjet_core::fit::{FitOutcome, FitReport};
use arcjet_core::frame::SourceInfo;
use arcjet_core::io::VideoMetadata;
use arcjet_core::pipeline::{AnalysisConfig, BatchOutcome};
use arcjet_core::reduce::TimeSeries;
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn title(s: &Styles, text: &str) {
    println!();
    println!("  {}", s.title.apply_to(text));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(text.chars().count())));
    println!();
}

fn row(s: &Styles, label: &str, value: impl std::fmt::Display) {
    println!("  {:<16}{}", s.label.apply_to(label), s.value.apply_to(value));
}

fn optional<T: std::fmt::Display>(s: &Styles, label: &str, value: Option<T>) {
    match value {
        Some(v) => row(s, label, v),
        None => println!("  {:<16}{}", s.label.apply_to(label), s.disabled.apply_to("unknown")),
    }
}

pub fn print_source_info(info: &SourceInfo, meta: &VideoMetadata, sidecar: &Path) {
    let s = Styles::new();
    title(&s, "Arcjet Frame Source");

    println!("  {:<16}{}", s.label.apply_to("Source"), s.path.apply_to(&info.name));
    row(&s, "Frames", info.total_frames);
    row(&s, "Dimensions", format!("{}x{}", info.width, info.height));
    row(&s, "Channels", info.channels);
    println!();

    println!("  {}", s.header.apply_to("Video Metadata"));
    println!("  {:<16}{}", s.label.apply_to("Sidecar"), s.path.apply_to(sidecar.display()));
    optional(&s, "Flow", meta.flow);
    match meta.good_range() {
        Some((first, last)) => row(&s, "Good frames", format!("{first}..={last}")),
        None => println!(
            "  {:<16}{}",
            s.label.apply_to("Good frames"),
            s.disabled.apply_to("none detected")
        ),
    }
    if let Some(crop) = meta.crop {
        row(
            &s,
            "Crop",
            format!("y {}..{}  x {}..{}", crop.y_min, crop.y_max, crop.x_min, crop.x_max),
        );
    }
    row(
        &s,
        "Brightness",
        format!("{} samples, stride {}", meta.brightness.len(), meta.brightness_stride),
    );
    println!();
}

pub fn print_analysis_summary(config: &AnalysisConfig) {
    let s = Styles::new();
    title(&s, "Arcjet Analysis");

    if let Some(input) = &config.input {
        println!("  {:<16}{}", s.label.apply_to("Input"), s.path.apply_to(input.display()));
    }
    println!(
        "  {:<16}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.resolved_output_dir().display())
    );
    row(&s, "Name", &config.name);
    match config.frames {
        Some((first, last)) => row(&s, "Frames", format!("{first}..={last}")),
        None => println!(
            "  {:<16}{}",
            s.label.apply_to("Frames"),
            s.method.apply_to("time of interest")
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Segmentation"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(&config.processor.segmentation)
    );
    match config.processor.flow {
        Some(flow) => println!("    {:<14}{}", s.label.apply_to("Flow"), s.value.apply_to(flow)),
        None => println!("    {:<14}{}", s.label.apply_to("Flow"), s.disabled.apply_to("inferred")),
    }
    println!(
        "    {:<14}{}",
        s.label.apply_to("Radii"),
        s.value.apply_to(format!("{:?}", config.processor.relative_radii))
    );
    println!();

    println!("  {}", s.header.apply_to("Reduction"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Settings"),
        s.value.apply_to(config.reduction.summary())
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Fit order"),
        s.method.apply_to(format!("{:?}", config.fit.order))
    );
    println!();
}

pub fn print_batch_outcome(outcome: &BatchOutcome) {
    let s = Styles::new();
    row(&s, "Processed", outcome.records.len());
    if !outcome.skipped.is_empty() {
        println!(
            "  {:<16}{}",
            s.label.apply_to("Skipped"),
            s.disabled.apply_to(format!("{} frame(s)", outcome.skipped.len()))
        );
    }
    if outcome.cancelled {
        println!("  {}", s.disabled.apply_to("Batch cancelled before the end of the range"));
    }
}

pub fn print_series_summary(series: &TimeSeries) {
    let s = Styles::new();
    row(&s, "Samples", series.len());
    row(&s, "Inliers", series.inlier_count());
    if series.scale.is_finite() {
        row(
            &s,
            "Scale",
            format!("{:.6} {}/px", series.scale, series.config.units.label()),
        );
    } else {
        println!("  {:<16}{}", s.label.apply_to("Scale"), s.disabled.apply_to("uncalibrated"));
    }
}

pub fn print_fit_report(report: &FitReport) {
    let s = Styles::new();
    let window = match report.window {
        Some((t0, t1)) => format!("[{t0:.4}, {t1:.4}) s"),
        None => String::from("all samples"),
    };
    println!();
    println!(
        "  {} {}",
        s.header.apply_to("Fits"),
        s.label.apply_to(format!("({:?}, {window})", report.order))
    );
    println!("  {:<28} {:>8}  {}", "Metric", "Samples", "Coefficients (± std err)");
    println!("  {}", "-".repeat(72));

    for entry in &report.entries {
        match &entry.outcome {
            FitOutcome::Fitted(fit) => {
                let terms: Vec<String> = fit
                    .coefficients
                    .iter()
                    .zip(&fit.std_errors)
                    .map(|(c, e)| format!("{c:.6} ± {e:.6}"))
                    .collect();
                println!(
                    "  {:<28} {:>8}  {}",
                    entry.metric,
                    fit.samples,
                    s.method.apply_to(terms.join(", "))
                );
            }
            FitOutcome::Skipped(reason) => {
                println!(
                    "  {:<28} {:>8}  {}",
                    entry.metric,
                    "-",
                    s.disabled.apply_to(format!("skipped: {reason}"))
                );
            }
        }
    }
}
