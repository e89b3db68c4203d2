use arcjet_core::edge::{Edge, EdgeMetrics};
use arcjet_core::frame::Frame;
use arcjet_core::record::{ResultRecord, TargetMeasurement};
use ndarray::{s, Array2, Array3};

/// Boolean mask with the half-open block `rows x cols` set.
pub fn rect_mask(
    h: usize,
    w: usize,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> Array2<bool> {
    let mut mask = Array2::from_elem((h, w), false);
    mask.slice_mut(s![rows, cols]).fill(true);
    mask
}

/// Black gray frame with one white block.
pub fn gray_block(
    h: usize,
    w: usize,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> Frame {
    let mut data = Array2::<u8>::zeros((h, w));
    data.slice_mut(s![rows, cols]).fill(255);
    Frame::gray(data)
}

/// Colored block `(rows, cols, rgb)` painted onto a frame.
pub type Paint = (std::ops::Range<usize>, std::ops::Range<usize>, [u8; 3]);

/// Uniform `background` color frame with blocks painted in order.
pub fn color_frame(h: usize, w: usize, background: [u8; 3], blocks: &[Paint]) -> Frame {
    let mut data = Array3::<u8>::zeros((h, w, 3));
    for c in 0..3 {
        data.slice_mut(s![.., .., c]).fill(background[c]);
    }
    for (rows, cols, rgb) in blocks {
        for c in 0..3 {
            data.slice_mut(s![rows.clone(), cols.clone(), c]).fill(rgb[c]);
        }
    }
    Frame::color(data).unwrap()
}

/// Record whose model was measured at the centre line only.
pub fn model_record(index: usize, area: f64, position: f64, radius: f64, center: f64) -> ResultRecord {
    let mut record = ResultRecord::new(index);
    record.model = Some(TargetMeasurement {
        edge: Edge::default(),
        area,
        centroid: (position, center),
        metrics: Some(EdgeMetrics {
            relative_radii: vec![0.0],
            center,
            low: center - radius,
            high: center + radius,
            radius,
            positions: vec![position],
        }),
    });
    record
}
