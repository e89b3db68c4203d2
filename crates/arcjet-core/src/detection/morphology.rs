use ndarray::Array2;

/// Binary structuring element, centred on its middle cell.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuringElement {
    cells: Array2<bool>,
}

impl StructuringElement {
    /// Filled ellipse inscribed in a `size` x `size` box. A 3x3 ellipse is a cross.
    pub fn ellipse(size: usize) -> Self {
        let size = size.max(1) | 1;
        let r = (size / 2) as f64;
        let cells = Array2::from_shape_fn((size, size), |(row, col)| {
            if r == 0.0 {
                return true;
            }
            let dy = row as f64 - r;
            let dx = col as f64 - r;
            // Row half-width of the inscribed ellipse, rounded like a raster fill.
            let half = (r * (1.0 - (dy / r).powi(2)).max(0.0).sqrt()).round();
            dx.abs() <= half
        });
        Self { cells }
    }

    /// Full `size` x `size` square.
    pub fn square(size: usize) -> Self {
        let size = size.max(1) | 1;
        Self {
            cells: Array2::from_elem((size, size), true),
        }
    }

    fn offsets(&self) -> Vec<(isize, isize)> {
        let (h, w) = self.cells.dim();
        let (cy, cx) = ((h / 2) as isize, (w / 2) as isize);
        self.cells
            .indexed_iter()
            .filter(|(_, &on)| on)
            .map(|((r, c), _)| (r as isize - cy, c as isize - cx))
            .collect()
    }
}

/// Morphological opening (erosion followed by dilation).
///
/// Removes foreground specks smaller than the kernel while preserving larger regions.
pub fn morphological_opening(mask: &Array2<bool>, kernel: &StructuringElement) -> Array2<bool> {
    let offsets = kernel.offsets();
    let eroded = erode(mask, &offsets);
    dilate(&eroded, &offsets)
}

/// A pixel stays true only if every kernel cell lands on a true pixel.
/// Out-of-bounds cells count as false.
fn erode(mask: &Array2<bool>, offsets: &[(isize, isize)]) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        mask[[row, col]]
            && offsets
                .iter()
                .all(|&(dr, dc)| sample(mask, row as isize + dr, col as isize + dc))
    })
}

/// A pixel becomes true if any kernel cell lands on a true pixel.
fn dilate(mask: &Array2<bool>, offsets: &[(isize, isize)]) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        offsets
            .iter()
            .any(|&(dr, dc)| sample(mask, row as isize - dr, col as isize - dc))
    })
}

fn sample(mask: &Array2<bool>, row: isize, col: isize) -> bool {
    let (h, w) = mask.dim();
    row >= 0 && col >= 0 && (row as usize) < h && (col as usize) < w && mask[[row as usize, col as usize]]
}
