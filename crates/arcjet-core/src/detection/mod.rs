pub mod components;
pub mod contours;
pub mod morphology;
pub mod threshold;

pub use components::{foreground_count, label_components, ComponentStats, LabelMap};
pub use contours::{extract_largest, find_external_contours};
pub use morphology::{morphological_opening, StructuringElement};
pub use threshold::{compute_mean_stddev, threshold_mask};
