use std::sync::Arc;

use ndarray::Array2;

use crate::error::{ArcjetError, Result};
use crate::flags::Flags;
use crate::frame::Frame;

use super::{Segmentation, Segmenter};

/// Label of pixels belonging to the test article body.
pub const CLASS_MODEL: u8 = 1;
/// Label of bow-shock pixels.
pub const CLASS_SHOCK: u8 = 2;
/// Label of the article's glowing surface layer, counted as model.
pub const CLASS_MODEL_SURFACE: u8 = 3;

/// External per-pixel classifier (4 classes: background, model, shock, surface).
///
/// Inference is synchronous and cannot be interrupted.
pub trait PixelClassifier: Send + Sync {
    /// Per-pixel labels with the same (height, width) as `frame`.
    fn classify(&self, frame: &Frame) -> Result<Array2<u8>>;
}

/// Segmentation delegated to a [`PixelClassifier`].
#[derive(Clone)]
pub struct LearnedClassifier {
    classifier: Arc<dyn PixelClassifier>,
}

impl LearnedClassifier {
    pub fn new(classifier: Arc<dyn PixelClassifier>) -> Self {
        Self { classifier }
    }
}

impl std::fmt::Debug for LearnedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearnedClassifier").finish_non_exhaustive()
    }
}

impl Segmenter for LearnedClassifier {
    fn name(&self) -> &'static str {
        "CNN"
    }

    fn segment(&self, crop: &Frame, _flags: &Flags) -> Result<Segmentation> {
        let labels = self.classifier.classify(crop)?;
        let expected = (crop.height(), crop.width());
        if labels.dim() != expected {
            return Err(ArcjetError::Classifier(format!(
                "label grid {:?} does not match frame {:?}",
                labels.dim(),
                expected
            )));
        }

        let model_mask = labels.mapv(|c| c == CLASS_MODEL || c == CLASS_MODEL_SURFACE);
        let shock_mask = labels.mapv(|c| c == CLASS_SHOCK);

        Ok(Segmentation::from_masks(
            &model_mask,
            Some(&shock_mask),
            Flags::default(),
        ))
    }
}
