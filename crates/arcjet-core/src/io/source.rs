use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ArcjetError, Result};
use crate::frame::{Frame, SourceInfo};

use super::image_io::{is_frame_file, load_frame};

/// Random-access supplier of decoded frames.
///
/// Implementations are shared between the batch worker and the caller, so
/// reads must be safe from any thread.
pub trait FrameSource: Send + Sync {
    fn frame_count(&self) -> usize;

    /// Decode frame `index`. The returned frame carries that index.
    fn read_frame(&self, index: usize) -> Result<Frame>;

    /// Dimensions and channel count, taken from the first frame.
    fn info(&self) -> Result<SourceInfo> {
        let first = self.read_frame(0)?;
        Ok(SourceInfo {
            name: self.name(),
            total_frames: self.frame_count(),
            width: first.width(),
            height: first.height(),
            channels: first.channels(),
        })
    }

    fn name(&self) -> String {
        String::from("frames")
    }
}

/// Directory of still images, ordered by file name.
#[derive(Clone, Debug)]
pub struct ImageSequence {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl ImageSequence {
    pub fn open(dir: &Path) -> Result<Self> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_frame_file(p))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(ArcjetError::FrameSource(format!(
                "no image frames in {}",
                dir.display()
            )));
        }
        info!(dir = %dir.display(), frames = files.len(), "Opened image sequence");

        Ok(Self {
            root: dir.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl FrameSource for ImageSequence {
    fn frame_count(&self) -> usize {
        self.files.len()
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        let path = self.files.get(index).ok_or(ArcjetError::FrameIndexOutOfRange {
            index,
            total: self.files.len(),
        })?;
        let frame = load_frame(path)
            .map_err(|e| ArcjetError::FrameSource(format!("{}: {e}", path.display())))?;
        Ok(frame.with_index(index))
    }

    fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }
}

/// Frames already held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    frames: Vec<Frame>,
}

impl MemorySource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }
}

impl FrameSource for MemorySource {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        self.frames
            .get(index)
            .cloned()
            .map(|f| f.with_index(index))
            .ok_or(ArcjetError::FrameIndexOutOfRange {
                index,
                total: self.frames.len(),
            })
    }

    fn name(&self) -> String {
        String::from("memory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::image_io::save_png;
    use ndarray::Array2;

    #[test]
    fn sequence_is_sorted_and_indexed() {
        let dir = tempfile::tempdir().unwrap();
        for (name, level) in [("f_002.png", 30u8), ("f_000.png", 10), ("f_001.png", 20)] {
            let frame = Frame::gray(Array2::from_elem((3, 4), level));
            save_png(&frame, &dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let seq = ImageSequence::open(dir.path()).unwrap();
        assert_eq!(seq.frame_count(), 3);
        let second = seq.read_frame(1).unwrap();
        assert_eq!(second.index(), 1);
        assert_eq!(second.to_gray()[[0, 0]], 20);

        let info = seq.info().unwrap();
        assert_eq!((info.width, info.height, info.channels), (4, 3, 1));
    }

    #[test]
    fn empty_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequence::open(dir.path()),
            Err(ArcjetError::FrameSource(_))
        ));
    }

    #[test]
    fn memory_source_bounds() {
        let src = MemorySource::new(vec![Frame::gray(Array2::zeros((2, 2)))]);
        assert!(src.read_frame(0).is_ok());
        assert!(matches!(
            src.read_frame(1),
            Err(ArcjetError::FrameIndexOutOfRange { index: 1, total: 1 })
        ));
    }
}
