use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArcjetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid crop window: {0}")]
    InvalidCrop(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Physical model diameter is required for calibration")]
    MissingDiameter,

    #[error("Record file name '{0}' does not end in a <first>_<last> frame range")]
    InvalidRecordFilename(String),

    #[error("Unsupported frame: {0}")]
    UnsupportedFrame(String),

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Frame source error: {0}")]
    FrameSource(String),

    #[error("No classifier available for {0} segmentation")]
    ClassifierUnavailable(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Batch worker panicked")]
    WorkerPanicked,
}

impl ArcjetError {
    /// Failures confined to one frame. A batch skips the frame and carries on;
    /// anything else aborts it.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Image(_)
                | Self::FrameSource(_)
                | Self::Classifier(_)
                | Self::UnsupportedFrame(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ArcjetError>;
