pub mod hsv;

pub use hsv::{hsv_filter, rgb_image_to_hsv, rgb_to_hsv, HsvRange};
