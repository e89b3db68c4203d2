pub mod gaussian_blur;
pub mod histogram;

pub use gaussian_blur::{blur_color, blur_gray, gaussian_blur_array};
pub use histogram::{gray_histogram, ExposureClass};
