use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiveColorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open input {path}: {reason}")]
    Input { path: PathBuf, reason: String },

    #[error("Not enough usable frames to analyze {0}")]
    InsufficientData(PathBuf),

    #[error("Failed to decode frame {index}: {reason}")]
    FrameDecode { index: usize, reason: String },

    #[error("Compute backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("{tool} failed: {reason}")]
    ExternalTool { tool: String, reason: String },

    #[error("Encoder error: {0}")]
    Encode(String),

    #[error("Invalid analysis data: {0}")]
    InvalidAnalysis(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl DiveColorError {
    pub fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn external(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Whether the pipeline may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FrameDecode { .. } | Self::BackendUnavailable(_) | Self::ExternalTool { .. }
        )
    }

    /// Human-readable explanation for end users.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input { path, .. } => format!(
                "Cannot open {}. Check that the file exists and is a supported video or image.",
                path.display()
            ),
            Self::InsufficientData(path) => format!(
                "Cannot analyze {}: no frame could be sampled for color estimation. \
                 The video may be too short or unreadable.",
                path.display()
            ),
            Self::FrameDecode { index, .. } => {
                format!("Cannot decode frames: frame {index} is corrupt or unreadable.")
            }
            Self::BackendUnavailable(_) => {
                "GPU acceleration is unavailable; processing continues on the CPU.".into()
            }
            Self::ExternalTool { tool, .. } => {
                format!("{tool} could not complete. Make sure it is installed and on PATH.")
            }
            Self::Encode(_) => "Cannot write the corrected video.".into(),
            Self::InvalidAnalysis(_) | Self::Json(_) => {
                "The analysis data is invalid or from an incompatible version.".into()
            }
            Self::Config(_) | Self::TomlDe(_) | Self::TomlSer(_) => {
                "The performance configuration could not be saved or read.".into()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiveColorError>;
