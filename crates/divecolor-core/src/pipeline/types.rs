use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::correction::SampledEntry;
use crate::error::{DiveColorError, Result};
use crate::frame::Dimensions;
use crate::rotation::Rotation;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Analyzing,
    AnalysisComplete,
    Processing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyzing => write!(f, "Analyzing"),
            Self::AnalysisComplete => write!(f, "Analysis complete"),
            Self::Processing => write!(f, "Processing"),
        }
    }
}

/// One progress notification. `progress` is in percent: analysis covers
/// 0..=50 and synthesis 50..=100.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    pub progress: f64,
    pub frames_processed: usize,
    pub total_frames: usize,
}

/// Thread-safe progress sink.
///
/// Any `Fn(&ProgressUpdate) + Send + Sync` closure is a reporter.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, _update: &ProgressUpdate) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// No-op progress reporter, used when the caller passes none.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Unvalidated form of [`AnalysisResult`], as produced by the analyzer or
/// read from disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub fps: f64,
    pub total_frames: usize,
    pub samples: Vec<SampledEntry>,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub video_bitrate: Option<u64>,
    #[serde(default)]
    pub audio_bitrate: Option<u64>,
}

/// Output of the analysis pass: sampled correction vectors plus everything the
/// synthesis pass needs. Always holds at least one sample, with strictly
/// increasing 1-based frame indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnalysisRecord")]
pub struct AnalysisResult {
    input_path: PathBuf,
    output_path: PathBuf,
    fps: f64,
    total_frames: usize,
    samples: Vec<SampledEntry>,
    rotation: Rotation,
    video_bitrate: Option<u64>,
    audio_bitrate: Option<u64>,
}

impl TryFrom<AnalysisRecord> for AnalysisResult {
    type Error = DiveColorError;

    fn try_from(record: AnalysisRecord) -> Result<Self> {
        Self::new(record)
    }
}

impl AnalysisResult {
    pub fn new(record: AnalysisRecord) -> Result<Self> {
        if record.samples.is_empty() {
            return Err(DiveColorError::InsufficientData(record.input_path));
        }
        if record.samples[0].frame_index == 0 {
            return Err(DiveColorError::InvalidAnalysis(
                "frame indices are 1-based".into(),
            ));
        }
        if let Some(pair) = record
            .samples
            .windows(2)
            .find(|w| w[1].frame_index <= w[0].frame_index)
        {
            return Err(DiveColorError::InvalidAnalysis(format!(
                "sample indices must increase strictly ({} then {})",
                pair[0].frame_index, pair[1].frame_index
            )));
        }
        if !record.fps.is_finite() || record.fps <= 0.0 {
            return Err(DiveColorError::InvalidAnalysis(format!(
                "frame rate must be positive (got {})",
                record.fps
            )));
        }
        Ok(Self {
            input_path: record.input_path,
            output_path: record.output_path,
            fps: record.fps,
            total_frames: record.total_frames,
            samples: record.samples,
            rotation: record.rotation,
            video_bitrate: record.video_bitrate,
            audio_bitrate: record.audio_bitrate,
        })
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn samples(&self) -> &[SampledEntry] {
        &self.samples
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn video_bitrate(&self) -> Option<u64> {
        self.video_bitrate
    }

    pub fn audio_bitrate(&self) -> Option<u64> {
        self.audio_bitrate
    }

    /// Point the synthesis pass at a different output file.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
}

/// Result of the synthesis pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessOutcome {
    pub status: OutcomeStatus,
    pub output_path: PathBuf,
    pub rotation_applied: Rotation,
    pub original_dimensions: Dimensions,
    pub output_dimensions: Dimensions,
    pub frames_written: usize,
    /// Whether the optional external re-encode replaced the output.
    pub reencoded: bool,
}

/// Result of a single-image correction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageOutcome {
    pub status: OutcomeStatus,
    pub output_path: PathBuf,
    pub message: String,
}
