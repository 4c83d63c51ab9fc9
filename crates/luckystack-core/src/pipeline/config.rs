use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SUPERRES;
use crate::error::{LuckyError, Result};
use crate::filters::UnsharpParams;
use crate::stack::CoaddMode;
use crate::store::validate_superres;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub videos: Vec<PathBuf>,
    /// Number of frames to combine. Accepted but not applied yet: every
    /// valid frame is coadded.
    #[serde(default)]
    pub nframes: Option<usize>,
    #[serde(default = "default_superres")]
    pub superres: f64,
    #[serde(default)]
    pub coadd: CoaddConfig,
    #[serde(default)]
    pub sharpen: UnsharpParams,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_superres() -> f64 {
    DEFAULT_SUPERRES
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            videos: Vec::new(),
            nframes: None,
            superres: DEFAULT_SUPERRES,
            coadd: CoaddConfig::default(),
            sharpen: UnsharpParams::default(),
            output: OutputConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Check parameters before any video is opened.
    pub fn validate(&self) -> Result<()> {
        if self.videos.is_empty() {
            return Err(LuckyError::InvalidConfig("no input videos given".into()));
        }
        validate_superres(self.superres)?;
        if !self.sharpen.sigma.is_finite() || self.sharpen.sigma < 0.0 {
            return Err(LuckyError::InvalidConfig(format!(
                "sharpening sigma must be a non-negative number, got {}",
                self.sharpen.sigma
            )));
        }
        if let Some(amount) = self.sharpen.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(LuckyError::InvalidConfig(format!(
                    "sharpening amount must be a non-negative number, got {amount}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CoaddConfig {
    #[serde(default)]
    pub mode: CoaddMode,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `<stem>_lucky.png` per video. `None` keeps
    /// results in memory only.
    #[serde(default = "default_output_dir")]
    pub dir: Option<PathBuf>,
    /// Also write the unsharpened coadd as 16-bit TIFF.
    #[serde(default)]
    pub save_coadd: bool,
}

fn default_output_dir() -> Option<PathBuf> {
    Some(PathBuf::from("."))
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            save_coadd: false,
        }
    }
}
