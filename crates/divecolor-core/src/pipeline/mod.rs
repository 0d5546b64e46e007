mod analyze;
mod corrector;
mod helpers;
mod image;
mod synthesize;
mod types;

pub use analyze::{analyze_video, sample_interval};
pub use corrector::ColorCorrector;
pub use image::correct_image;
pub use synthesize::synthesize_video;
pub use types::{
    AnalysisRecord, AnalysisResult, ImageOutcome, NoOpReporter, OutcomeStatus, PipelineStage,
    ProcessOutcome, ProgressReporter, ProgressUpdate,
};
