#[allow(dead_code)]
mod common;

use approx::assert_relative_eq;
use arcjet_core::color::HsvRange;
use arcjet_core::edge::FlowDirection;
use arcjet_core::frame::{CropWindow, Frame};
use arcjet_core::io::{save_png, FrameSource, ImageSequence, MemorySource};
use arcjet_core::pipeline::{derive_metadata, run_analysis, AnalysisConfig, NoOpReporter};
use arcjet_core::processor::{FrameProcessor, ProcessorConfig};
use arcjet_core::segment::SegmentationMethod;
use arcjet_core::toi::{brightness_signal, time_of_interest, ThresholdClassifier, ToiConfig};
use ndarray::{s, Array2};
use tempfile::TempDir;

use common::{color_frame, gray_block};

const BACKGROUND: [u8; 3] = [10, 10, 10];
const MODEL_GLOW: [u8; 3] = [255, 255, 240];
const SHOCK_GLOW: [u8; 3] = [200, 0, 200];

fn arcjet_frame() -> Frame {
    color_frame(
        120,
        120,
        BACKGROUND,
        &[(40..80, 60..100, MODEL_GLOW), (30..90, 20..40, SHOCK_GLOW)],
    )
}

fn gray_config() -> ProcessorConfig {
    ProcessorConfig {
        segmentation: SegmentationMethod::Gray { threshold: 150 },
        flow: Some(FlowDirection::Right),
        ..ProcessorConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Frame processor
// ---------------------------------------------------------------------------

#[test]
fn test_gray_block_end_to_end() {
    let mut processor = FrameProcessor::new(gray_config(), None).unwrap();
    let output = processor.process(&gray_block(120, 120, 25..95, 25..95)).unwrap();

    let bbox = output.model_contour.unwrap().bounding_rect().unwrap();
    assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (25, 25, 70, 70));
    assert!(output.shock_contour.is_none());

    let flags = output.record.flags;
    assert!(!flags.model_failed());
    assert!(flags.shock_failed());
    assert!(output.record.model.is_some());
}

#[test]
fn test_auto_hsv_end_to_end() {
    let mut processor = FrameProcessor::new(
        ProcessorConfig {
            flow: Some(FlowDirection::Right),
            ..ProcessorConfig::default()
        },
        None,
    )
    .unwrap();
    let output = processor.process(&arcjet_frame()).unwrap();

    let model = output.model_contour.unwrap().bounding_rect().unwrap();
    assert_eq!((model.x, model.y, model.width, model.height), (60, 40, 40, 40));
    let shock = output.shock_contour.unwrap().bounding_rect().unwrap();
    assert_eq!((shock.x, shock.y, shock.width, shock.height), (20, 30, 20, 60));

    let flags = output.record.flags;
    assert!(!flags.model_failed());
    assert!(!flags.shock_failed());
    assert_eq!(flags.dim_shock, Some(false));
    assert!(!flags.is_underexposed());

    // Leading faces under rightward flow are the left sides.
    let record = &output.record;
    assert_eq!(record.position_at(arcjet_core::record::Target::Model, 0.0), Some(60.0));
    assert_eq!(record.position_at(arcjet_core::record::Target::Shock, 0.0), Some(20.0));
}

#[test]
fn test_fixed_hsv_end_to_end() {
    // Value floors sit between the blurred inner and outer border pixels.
    let config = ProcessorConfig {
        segmentation: SegmentationMethod::FixedHsv {
            model: HsvRange::new([0, 0, 100], [180, 70, 255]),
            shock: HsvRange::new([125, 60, 90], [170, 255, 255]),
        },
        flow: Some(FlowDirection::Right),
        ..ProcessorConfig::default()
    };
    let mut processor = FrameProcessor::new(config, None).unwrap();
    let output = processor.process(&arcjet_frame()).unwrap();

    let model = output.model_contour.unwrap().bounding_rect().unwrap();
    assert_eq!((model.x, model.y, model.width, model.height), (60, 40, 40, 40));
    let shock = output.shock_contour.unwrap().bounding_rect().unwrap();
    assert_eq!((shock.x, shock.y, shock.width, shock.height), (20, 30, 20, 60));

    let flags = output.record.flags;
    assert!(!flags.model_failed());
    assert!(!flags.shock_failed());
    assert_eq!(flags.dim_shock, None);
}

#[test]
fn test_crop_keeps_global_coordinates() {
    let mut processor = FrameProcessor::new(
        ProcessorConfig {
            flow: Some(FlowDirection::Right),
            crop: Some(CropWindow::new(20, 100, 10, 110)),
            ..ProcessorConfig::default()
        },
        None,
    )
    .unwrap();
    let output = processor.process(&arcjet_frame()).unwrap();
    let model = output.model_contour.unwrap().bounding_rect().unwrap();
    assert_eq!((model.x, model.y), (60, 40));
    let edge = &output.record.model.as_ref().unwrap().edge;
    assert!(edge.points.iter().all(|p| p.x == 60));
}

#[test]
fn test_gray_frame_rejected_by_color_strategy() {
    let mut processor = FrameProcessor::new(ProcessorConfig::default(), None).unwrap();
    let err = processor.process(&gray_block(40, 40, 10..30, 10..30)).unwrap_err();
    assert!(err.is_frame_local());
}

#[test]
fn test_cnn_requires_classifier() {
    let config = ProcessorConfig {
        segmentation: SegmentationMethod::Cnn,
        ..ProcessorConfig::default()
    };
    assert!(FrameProcessor::new(config, None).is_err());
}

// ---------------------------------------------------------------------------
// Full analysis
// ---------------------------------------------------------------------------

/// Model block sliding 2 px per frame.
fn sliding_frames(n: usize) -> Vec<Frame> {
    (0..n)
        .map(|i| gray_block(60, 80, 20..40, 10 + 2 * i..30 + 2 * i))
        .collect()
}

#[test]
fn test_run_analysis_on_sliding_block() {
    let source = MemorySource::new(sliding_frames(8));
    let mut config = AnalysisConfig {
        frames: Some((0, 7)),
        processor: gray_config(),
        ..AnalysisConfig::default()
    };
    config.reduction.diameter = Some(19.0);
    config.reduction.frame_rate = 1.0;
    config.fit.include_pixel = true;

    let output = run_analysis(&config, &source, None, &ThresholdClassifier::default()).unwrap();
    assert_eq!(output.frames, 0..8);
    assert_eq!(output.outcome.records.len(), 8);
    assert!(output.series.inlier.iter().all(|&ok| ok));

    // Edge spans rows 20..=39, so the radius is 9.5 px.
    assert_relative_eq!(output.series.scale, 1.0);
    let position = output.fits.fitted("MODEL_XPOS_0.00_PX").unwrap();
    assert_relative_eq!(position.coefficients[0], 10.0, epsilon = 1e-9);
    assert_relative_eq!(position.coefficients[1], 2.0, epsilon = 1e-9);
}

#[test]
fn test_run_analysis_requires_diameter() {
    let source = MemorySource::new(sliding_frames(3));
    let config = AnalysisConfig {
        frames: Some((0, 2)),
        processor: gray_config(),
        ..AnalysisConfig::default()
    };
    assert!(run_analysis(&config, &source, None, &ThresholdClassifier::default()).is_err());
}

#[test]
fn test_time_of_interest_brackets_bright_frames() {
    let frames: Vec<Frame> = (0..100)
        .map(|i| {
            let level = if (30..70).contains(&i) { 200 } else { 10 };
            Frame::gray(Array2::from_elem((8, 8), level))
        })
        .collect();
    let source = MemorySource::new(frames);
    let config = ToiConfig {
        stride: 1,
        ..ToiConfig::default()
    };
    let brightness = brightness_signal(&source, config.stride, None, &NoOpReporter).unwrap();
    assert_eq!(brightness.len(), 100);

    let toi = time_of_interest(&brightness, 100, &config, &ThresholdClassifier::default())
        .unwrap()
        .unwrap();
    assert!((28..=32).contains(&toi.first), "first = {}", toi.first);
    assert!((67..=71).contains(&toi.last), "last = {}", toi.last);
    assert_eq!(toi.runs.len(), 1);
}

#[test]
fn test_image_sequence_reads_in_name_order() {
    let dir = TempDir::new().unwrap();
    for (i, frame) in sliding_frames(3).iter().enumerate() {
        save_png(frame, &dir.path().join(format!("frame_{i:04}.png"))).unwrap();
    }
    std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

    let source = ImageSequence::open(dir.path()).unwrap();
    assert_eq!(source.frame_count(), 3);
    let frame = source.read_frame(2).unwrap();
    assert_eq!(frame.index(), 2);
    assert_eq!((frame.width(), frame.height()), (80, 60));
    assert_eq!(frame.to_gray()[[30, 14]], 255);
    assert_eq!(frame.to_gray()[[30, 12]], 0);
}

/// Dark frames around a run whose glow sits in the right-hand columns.
fn glow_on_right(n: usize, lit: std::ops::Range<usize>) -> Vec<Frame> {
    (0..n)
        .map(|i| {
            let mut data = Array2::from_elem((8, 16), 10u8);
            if lit.contains(&i) {
                data.slice_mut(s![.., 12..16]).fill(200);
            }
            Frame::gray(data)
        })
        .collect()
}

#[test]
fn test_metadata_flow_comes_from_lit_frames() {
    let source = MemorySource::new(glow_on_right(100, 30..70));
    let config = ToiConfig {
        stride: 1,
        ..ToiConfig::default()
    };
    let meta =
        derive_metadata(&source, &config, &ThresholdClassifier::default(), &NoOpReporter).unwrap();

    assert_eq!((meta.width, meta.height, meta.frame_count), (16, 8, 100));
    assert!(meta.good_range().is_some());
    assert_eq!(meta.flow, Some(FlowDirection::Left));
}

#[test]
fn test_metadata_flow_unset_without_time_of_interest() {
    let source = MemorySource::new(glow_on_right(20, 0..0));
    let meta = derive_metadata(
        &source,
        &ToiConfig::default(),
        &ThresholdClassifier::default(),
        &NoOpReporter,
    )
    .unwrap();
    assert_eq!(meta.good_range(), None);
    assert_eq!(meta.flow, None);
}
