use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use ndarray::{Array2, Array3};

use crate::error::{ArcjetError, Result};
use crate::frame::{Frame, PixelData};

/// File extensions recognised as still frames.
pub const FRAME_EXTENSIONS: &[&str] = &["png", "tif", "tiff", "jpg", "jpeg", "bmp"];

pub fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode an image file into an 8-bit frame.
///
/// Single-channel images (with or without alpha) stay grey; everything else
/// is converted to RGB.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    Ok(frame_from_image(img))
}

pub fn frame_from_image(img: DynamicImage) -> Frame {
    let is_gray = matches!(
        img,
        DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_)
    );

    if is_gray {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        let data = Array2::from_shape_vec((h as usize, w as usize), gray.into_raw())
            .unwrap_or_else(|_| Array2::zeros((h as usize, w as usize)));
        Frame::gray(data)
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        let data = Array3::from_shape_vec((h as usize, w as usize, 3), rgb.into_raw())
            .unwrap_or_else(|_| Array3::zeros((h as usize, w as usize, 3)));
        Frame {
            pixels: PixelData::Color(data),
            metadata: Default::default(),
        }
    }
}

/// Write a frame as an 8-bit PNG.
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let (w, h) = (frame.width() as u32, frame.height() as u32);
    match &frame.pixels {
        PixelData::Gray(d) => {
            let img = GrayImage::from_raw(w, h, d.iter().copied().collect())
                .ok_or_else(|| ArcjetError::UnsupportedFrame("grey buffer size mismatch".into()))?;
            img.save_with_format(path, ImageFormat::Png)?;
        }
        PixelData::Color(d) => {
            let img = RgbImage::from_raw(w, h, d.iter().copied().collect())
                .ok_or_else(|| ArcjetError::UnsupportedFrame("colour buffer size mismatch".into()))?;
            img.save_with_format(path, ImageFormat::Png)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_frame_extensions() {
        assert!(is_frame_file(Path::new("a/frame_0001.PNG")));
        assert!(is_frame_file(Path::new("b.tiff")));
        assert!(!is_frame_file(Path::new("run_000_010.json")));
        assert!(!is_frame_file(Path::new("noext")));
    }

    #[test]
    fn png_round_trip_keeps_color_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.png");
        let mut data = Array3::<u8>::zeros((4, 6, 3));
        data[[1, 2, 0]] = 200;
        data[[3, 5, 2]] = 90;
        let frame = Frame::color(data.clone()).unwrap();
        save_png(&frame, &path).unwrap();
        let back = load_frame(&path).unwrap();
        assert_eq!(back.pixels, PixelData::Color(data));
    }
}
