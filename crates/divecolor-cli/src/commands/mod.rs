pub mod analyze;
pub mod config;
pub mod correct;
pub mod image;
pub mod info;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use divecolor_core::config::PerformanceStore;
use divecolor_core::io::FfmpegMedia;
use divecolor_core::pipeline::{ColorCorrector, ProgressUpdate};
use divecolor_core::DiveColorError;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Settings shared by every subcommand.
pub struct Context {
    pub perf_config: PathBuf,
}

impl Context {
    pub fn store(&self) -> Arc<PerformanceStore> {
        Arc::new(PerformanceStore::open(&self.perf_config))
    }

    /// Corrector backed by the system FFmpeg.
    pub fn corrector(&self) -> Result<ColorCorrector> {
        let media = FfmpegMedia::locate().map_err(user_error)?;
        debug!(perf_config = %self.perf_config.display(), "Using performance settings");
        Ok(ColorCorrector::new(self.store(), Arc::new(media)))
    }
}

/// Wrap a core error so the user-facing explanation is printed first.
pub fn user_error(e: DiveColorError) -> anyhow::Error {
    let message = e.user_message();
    anyhow::Error::new(e).context(message)
}

pub fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}%")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

pub fn update_bar(pb: &ProgressBar, update: &ProgressUpdate) {
    pb.set_message(update.stage.to_string());
    pb.set_position(update.progress.clamp(0.0, 100.0) as u64);
}

/// `dive.mp4` -> `dive_corrected.mp4`, next to the input.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    let name = match input.extension() {
        Some(ext) => format!("{stem}_corrected.{}", ext.to_string_lossy()),
        None => format!("{stem}_corrected"),
    };
    input.with_file_name(name)
}
