/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Number of channels in a color frame (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Upper bound of the hue channel (8-bit convention, degrees / 2).
pub const HUE_MAX: u8 = 180;

/// Number of bins in the 8-bit grayscale histogram.
pub const GRAY_HISTOGRAM_BINS: usize = 256;

/// Shock masks with fewer foreground pixels than this are re-filtered with
/// the dim-tolerant range set and flagged `DIM_SHOCK`.
pub const DEFAULT_MIN_SHOCK_PIXELS: usize = 500;

/// Perpendicular distance (pixels) within which an edge point matches an
/// interpolation target.
pub const DEFAULT_INTERP_TOLERANCE: f64 = 3.0;

/// Relative radii sampled along the leading edge.
pub const DEFAULT_RELATIVE_RADII: [f64; 5] = [-0.95, -0.50, 0.0, 0.50, 0.95];

/// Neighbour count for local-outlier-factor scoring.
pub const DEFAULT_OUTLIER_NEIGHBORS: usize = 11;

/// LOF scores above this mark a frame as an outlier.
pub const DEFAULT_LOF_THRESHOLD: f64 = 1.5;

/// Added to mean reachability distances so duplicate samples stay finite.
pub const LOF_EPSILON: f64 = 1e-10;

/// Global threshold for the grayscale segmentation strategy.
pub const DEFAULT_GRAY_THRESHOLD: u8 = 150;

/// Fraction of crop pixels that triggers the exposure flags (0.5%).
pub const DEFAULT_EXPOSURE_FRACTION: f64 = 0.005;

/// Pixels at or above this gray level count toward `OVEREXPOSED`.
pub const OVEREXPOSED_LEVEL: usize = 250;

/// Pixels above this gray level count as "lit" for `UNDEREXPOSED`.
pub const UNDEREXPOSED_LEVEL: usize = 128;

/// Pixels at or above this gray level count toward `MODEL_VISIBLE`.
pub const MODEL_VISIBLE_LEVEL: usize = 200;

/// Gaussian sigma matching a 5x5 smoothing kernel.
pub const DEFAULT_BLUR_SIGMA: f32 = 1.1;

/// Gaussian sigma used when locating the brightest pixel for flow inference.
pub const FLOW_INFERENCE_BLUR_SIGMA: f32 = 2.0;

/// Diameter of the elliptical kernel used to open underexposed masks.
pub const OPENING_KERNEL_SIZE: usize = 3;

/// Default frame stride when sampling the brightness signal.
pub const DEFAULT_TOI_STRIDE: usize = 10;

/// Default centred moving-average window applied to the brightness signal.
pub const DEFAULT_TOI_SMOOTHING: usize = 5;

/// Fixed input/output length of the threshold sequence classifier.
pub const DEFAULT_TOI_SEQUENCE_LEN: usize = 256;

/// Values above this are "interesting" in classifier output.
pub const TOI_LABEL_THRESHOLD: f32 = 0.5;

/// Default camera frame rate in frames per second.
pub const DEFAULT_FRAME_RATE: f64 = 2000.0;
