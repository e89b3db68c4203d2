use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::edge::FlowDirection;
use crate::error::Result;
use crate::frame::CropWindow;

/// Per-video facts worth keeping between sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub frame_count: usize,
    pub first_good_frame: Option<usize>,
    pub last_good_frame: Option<usize>,
    pub flow: Option<FlowDirection>,
    pub crop: Option<CropWindow>,
    /// Mean crop brightness per sampled frame.
    #[serde(default)]
    pub brightness: Vec<f64>,
    /// Frame stride between `brightness` samples.
    #[serde(default = "default_stride")]
    pub brightness_stride: usize,
}

fn default_stride() -> usize {
    1
}

impl VideoMetadata {
    pub fn good_range(&self) -> Option<(usize, usize)> {
        Some((self.first_good_frame?, self.last_good_frame?))
    }
}

/// `<input>.meta.json` next to the input.
pub fn sidecar_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".meta.json");
    input.with_file_name(name)
}

pub fn load_metadata(path: &Path) -> Result<VideoMetadata> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn save_metadata(path: &Path, meta: &VideoMetadata) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, meta)?;
    writer.flush()?;
    Ok(())
}

/// Load the sidecar for `input`, or run `derive` and persist its result.
pub fn load_or_derive<F>(input: &Path, derive: F) -> Result<VideoMetadata>
where
    F: FnOnce() -> Result<VideoMetadata>,
{
    let path = sidecar_path(input);
    if path.exists() {
        debug!(path = %path.display(), "Reusing video metadata");
        return load_metadata(&path);
    }

    let meta = derive()?;
    save_metadata(&path, &meta)?;
    info!(path = %path.display(), frames = meta.frame_count, "Derived video metadata");
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn meta() -> VideoMetadata {
        VideoMetadata {
            width: 640,
            height: 480,
            channels: 3,
            frame_count: 1200,
            first_good_frame: Some(40),
            last_good_frame: Some(1100),
            flow: Some(FlowDirection::Left),
            crop: Some(CropWindow::new(10, 400, 0, 600)),
            brightness: vec![0.1, 0.5, 0.9],
            brightness_stride: 10,
        }
    }

    #[test]
    fn sidecar_sits_next_to_input() {
        assert_eq!(
            sidecar_path(Path::new("/data/run7")),
            PathBuf::from("/data/run7.meta.json")
        );
        assert_eq!(
            sidecar_path(Path::new("clip.avi")),
            PathBuf::from("clip.avi.meta.json")
        );
    }

    #[test]
    fn derives_once_then_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run7");
        let calls = Cell::new(0);
        let derive = || {
            calls.set(calls.get() + 1);
            Ok(meta())
        };

        let first = load_or_derive(&input, derive).unwrap();
        let second = load_or_derive(&input, || {
            calls.set(calls.get() + 1);
            Ok(meta())
        })
        .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(first, second);
        assert_eq!(second.good_range(), Some((40, 1100)));
    }
}
