use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArcjetError, Result};
use crate::fit::FitConfig;
use crate::processor::ProcessorConfig;
use crate::reduce::ReductionConfig;
use crate::toi::ToiConfig;

/// Everything needed to take one video from frames to fitted metrics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory of frames.
    pub input: Option<PathBuf>,
    /// Where records, tables and fits are written. Defaults to the input's parent.
    pub output_dir: Option<PathBuf>,
    /// Stem of every output file name.
    pub name: String,
    /// Inclusive frame range. `None` uses the detected time of interest.
    pub frames: Option<(usize, usize)>,
    pub processor: ProcessorConfig,
    pub reduction: ReductionConfig,
    pub fit: FitConfig,
    pub toi: ToiConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: None,
            output_dir: None,
            name: String::from("run"),
            frames: None,
            processor: ProcessorConfig::default(),
            reduction: ReductionConfig::default(),
            fit: FitConfig::default(),
            toi: ToiConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings no stage could run with.
    pub fn validate(&self) -> Result<()> {
        if let Some((first, last)) = self.frames {
            if first > last {
                return Err(ArcjetError::InvalidConfig(format!(
                    "frame range {first}..={last} is empty"
                )));
            }
        }
        if self.reduction.stride == 0 {
            return Err(ArcjetError::InvalidConfig("reduction stride must be at least 1".into()));
        }
        if let Some(d) = self.reduction.diameter {
            if !(d.is_finite() && d > 0.0) {
                return Err(ArcjetError::InvalidConfig(format!("diameter {d} must be positive")));
            }
        }
        if self.processor.interp_tolerance < 0.0 {
            return Err(ArcjetError::InvalidConfig("interpolation tolerance must be non-negative".into()));
        }
        Ok(())
    }

    /// Output directory, falling back to the input's parent and then `.`.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(|| {
                self.input
                    .as_ref()
                    .and_then(|p| p.parent())
                    .map(Path::to_path_buf)
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
