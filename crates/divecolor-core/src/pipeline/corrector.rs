use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::compute::{create_backend, FilterApplicator};
use crate::config::{PerformanceConfig, PerformanceInfo, PerformanceStore, PerformanceUpdate};
use crate::error::Result;
use crate::io::MediaIo;

use super::analyze::analyze_video;
use super::image::correct_image;
use super::synthesize::synthesize_video;
use super::types::{
    AnalysisResult, ImageOutcome, NoOpReporter, PipelineStage, ProcessOutcome, ProgressReporter,
    ProgressUpdate,
};

/// Entry point for every correction operation.
///
/// Each call reads the performance configuration once at its start, so a
/// concurrent [`configure`](Self::configure) only affects later calls.
#[derive(Clone)]
pub struct ColorCorrector {
    store: Arc<PerformanceStore>,
    media: Arc<dyn MediaIo>,
}

impl ColorCorrector {
    pub fn new(store: Arc<PerformanceStore>, media: Arc<dyn MediaIo>) -> Self {
        Self { store, media }
    }

    pub fn store(&self) -> &PerformanceStore {
        &self.store
    }

    fn applicator(&self, config: &PerformanceConfig) -> FilterApplicator {
        FilterApplicator::new(create_backend(config.use_gpu, self.store.gpu()))
    }

    /// Pass 1: sample `input` and estimate correction vectors.
    pub fn analyze(
        &self,
        input: &Path,
        output: &Path,
        reporter: Option<&dyn ProgressReporter>,
    ) -> Result<AnalysisResult> {
        analyze_video(
            self.media.as_ref(),
            input,
            output,
            self.store.core_count(),
            reporter.unwrap_or(&NoOpReporter),
        )
    }

    /// Pass 2: write the corrected video described by `analysis`.
    pub fn process(
        &self,
        analysis: AnalysisResult,
        reporter: Option<&dyn ProgressReporter>,
    ) -> Result<ProcessOutcome> {
        let config = self.store.snapshot();
        let applicator = self.applicator(&config);
        synthesize_video(
            self.media.as_ref(),
            &applicator,
            &config,
            self.store.core_count(),
            analysis,
            reporter.unwrap_or(&NoOpReporter),
        )
    }

    /// Both passes back to back.
    pub fn correct_video(
        &self,
        input: &Path,
        output: &Path,
        reporter: Option<&dyn ProgressReporter>,
    ) -> Result<ProcessOutcome> {
        let reporter = reporter.unwrap_or(&NoOpReporter);
        let analysis = self.analyze(input, output, Some(reporter))?;
        reporter.report(&ProgressUpdate {
            stage: PipelineStage::AnalysisComplete,
            progress: 50.0,
            frames_processed: 0,
            total_frames: analysis.total_frames(),
        });
        self.process(analysis, Some(reporter))
    }

    pub fn correct_single_image(&self, input: &Path, output: &Path) -> Result<ImageOutcome> {
        let config = self.store.snapshot();
        correct_image(&self.applicator(&config), input, output)
    }

    pub fn configure(&self, update: &PerformanceUpdate) -> Result<PerformanceConfig> {
        let config = self.store.configure(update)?;
        info!(path = %self.store.path().display(), "Performance settings saved");
        Ok(config)
    }

    pub fn performance_info(&self) -> PerformanceInfo {
        self.store.info()
    }
}
