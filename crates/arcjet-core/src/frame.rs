use ndarray::{s, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::consts::{COLOR_CHANNEL_COUNT, LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::error::{ArcjetError, Result};

/// Pixel storage for a single frame.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelData {
    /// Shape = (height, width).
    Gray(Array2<u8>),
    /// Shape = (height, width, 3), RGB channel order.
    Color(Array3<u8>),
}

/// A single video frame. Pixel values are 8-bit.
#[derive(Clone, Debug)]
pub struct Frame {
    pub pixels: PixelData,
    pub metadata: FrameMetadata,
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
}

impl Frame {
    pub fn gray(data: Array2<u8>) -> Self {
        Self {
            pixels: PixelData::Gray(data),
            metadata: FrameMetadata::default(),
        }
    }

    /// Build a color frame. The third axis must hold exactly 3 channels.
    pub fn color(data: Array3<u8>) -> Result<Self> {
        if data.len_of(Axis(2)) != COLOR_CHANNEL_COUNT {
            return Err(ArcjetError::UnsupportedFrame(format!(
                "expected {COLOR_CHANNEL_COUNT} channels, got {}",
                data.len_of(Axis(2))
            )));
        }
        Ok(Self {
            pixels: PixelData::Color(data),
            metadata: FrameMetadata::default(),
        })
    }

    pub fn with_index(mut self, frame_index: usize) -> Self {
        self.metadata.frame_index = frame_index;
        self
    }

    pub fn index(&self) -> usize {
        self.metadata.frame_index
    }

    pub fn width(&self) -> usize {
        match &self.pixels {
            PixelData::Gray(d) => d.ncols(),
            PixelData::Color(d) => d.len_of(Axis(1)),
        }
    }

    pub fn height(&self) -> usize {
        match &self.pixels {
            PixelData::Gray(d) => d.nrows(),
            PixelData::Color(d) => d.len_of(Axis(0)),
        }
    }

    pub fn channels(&self) -> usize {
        match &self.pixels {
            PixelData::Gray(_) => 1,
            PixelData::Color(_) => COLOR_CHANNEL_COUNT,
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self.pixels, PixelData::Color(_))
    }

    /// Single-channel intensity. Color frames use BT.601 luminance weights.
    pub fn to_gray(&self) -> Array2<u8> {
        match &self.pixels {
            PixelData::Gray(d) => d.clone(),
            PixelData::Color(d) => {
                let (h, w, _) = d.dim();
                Array2::from_shape_fn((h, w), |(row, col)| {
                    let v = LUMINANCE_R * d[[row, col, 0]] as f32
                        + LUMINANCE_G * d[[row, col, 1]] as f32
                        + LUMINANCE_B * d[[row, col, 2]] as f32;
                    v.round().clamp(0.0, 255.0) as u8
                })
            }
        }
    }

    /// Copy out the region of interest. The window must already fit the frame.
    pub fn crop(&self, window: &CropWindow) -> Result<Frame> {
        window.validate(self.width(), self.height())?;
        let rows = window.y_min..window.y_max;
        let cols = window.x_min..window.x_max;
        let pixels = match &self.pixels {
            PixelData::Gray(d) => PixelData::Gray(d.slice(s![rows, cols]).to_owned()),
            PixelData::Color(d) => PixelData::Color(d.slice(s![rows, cols, ..]).to_owned()),
        };
        Ok(Frame {
            pixels,
            metadata: self.metadata.clone(),
        })
    }
}

/// Half-open region of interest `[y_min, y_max) x [x_min, x_max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    pub y_min: usize,
    pub y_max: usize,
    pub x_min: usize,
    pub x_max: usize,
}

impl CropWindow {
    pub fn new(y_min: usize, y_max: usize, x_min: usize, x_max: usize) -> Self {
        Self {
            y_min,
            y_max,
            x_min,
            x_max,
        }
    }

    /// Window covering an entire `width` x `height` frame.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, height, 0, width)
    }

    pub fn width(&self) -> usize {
        self.x_max.saturating_sub(self.x_min)
    }

    pub fn height(&self) -> usize {
        self.y_max.saturating_sub(self.y_min)
    }

    /// Crop-local to frame-global offset as `(x, y)`.
    pub fn offset(&self) -> (i32, i32) {
        (self.x_min as i32, self.y_min as i32)
    }

    /// Both ranges must be non-empty and inside the frame. Never clamps.
    pub fn validate(&self, frame_width: usize, frame_height: usize) -> Result<()> {
        if self.y_max <= self.y_min || self.x_max <= self.x_min {
            return Err(ArcjetError::InvalidCrop(format!(
                "degenerate window y=[{}, {}) x=[{}, {})",
                self.y_min, self.y_max, self.x_min, self.x_max
            )));
        }
        if self.y_max > frame_height || self.x_max > frame_width {
            return Err(ArcjetError::InvalidCrop(format!(
                "window y=[{}, {}) x=[{}, {}) exceeds frame {}x{}",
                self.y_min, self.y_max, self.x_min, self.x_max, frame_width, frame_height
            )));
        }
        Ok(())
    }
}

impl std::str::FromStr for CropWindow {
    type Err = ArcjetError;

    /// Parses `y_min,y_max,x_min,x_max`. Empty windows are rejected.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<usize> = s
            .split(',')
            .map(|p| p.trim().parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| ArcjetError::InvalidCrop(format!("'{s}': {e}")))?;
        match parts.as_slice() {
            &[y_min, y_max, x_min, x_max] if y_min < y_max && x_min < x_max => {
                Ok(Self::new(y_min, y_max, x_min, x_max))
            }
            &[_, _, _, _] => Err(ArcjetError::InvalidCrop(format!("'{s}': window is empty"))),
            _ => Err(ArcjetError::InvalidCrop(format!(
                "'{s}': expected y_min,y_max,x_min,x_max"
            ))),
        }
    }
}

/// Metadata about a frame source.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub name: String,
    pub total_frames: usize,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_parses_four_bounds() {
        let crop: CropWindow = "10, 90,0,200".parse().unwrap();
        assert_eq!(crop, CropWindow::new(10, 90, 0, 200));
        assert_eq!((crop.width(), crop.height()), (200, 80));
    }

    #[test]
    fn malformed_crop_is_rejected() {
        assert!(matches!("10,5,0,200".parse::<CropWindow>(), Err(ArcjetError::InvalidCrop(_))));
        assert!("1,2,3".parse::<CropWindow>().is_err());
        assert!("a,2,3,4".parse::<CropWindow>().is_err());
    }
}
