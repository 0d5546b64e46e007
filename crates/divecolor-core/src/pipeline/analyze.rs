use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::consts::{FALLBACK_FPS, FRAME_ITERATION_CEILING, SAMPLE_SECONDS};
use crate::correction::{analysis_raster, estimate_correction, SampledEntry};
use crate::error::{DiveColorError, Result};
use crate::frame::RgbFrame;
use crate::io::MediaIo;
use crate::rotation::{resolve_rotation, rotate_frame};

use super::helpers::{open_decoder, progress_fraction};
use super::types::{AnalysisRecord, AnalysisResult, PipelineStage, ProgressReporter, ProgressUpdate};

/// Frames between two samples: one per [`SAMPLE_SECONDS`] of footage.
pub fn sample_interval(fps: f64) -> usize {
    ((fps * SAMPLE_SECONDS).ceil() as usize).max(1)
}

/// First pass: decode `input` once, keep a reduced copy of every sampled frame,
/// then estimate a correction vector for each sample on a pool of up to
/// `cores` threads.
pub fn analyze_video(
    media: &dyn MediaIo,
    input: &Path,
    output: &Path,
    cores: usize,
    reporter: &dyn ProgressReporter,
) -> Result<AnalysisResult> {
    let probe = match media.probe(input) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(path = %input.display(), error = %e, "Metadata probe failed");
            None
        }
    };
    let rotation = resolve_rotation(probe.as_ref(), media, input);

    let mut decoder = open_decoder(media, input)?;
    let info = decoder.stream_info();
    let fps = if info.fps.is_finite() && info.fps > 0.0 {
        info.fps
    } else {
        probe.as_ref().and_then(|p| p.fps).unwrap_or(FALLBACK_FPS)
    };
    let total = probe
        .as_ref()
        .and_then(|p| p.frame_count)
        .filter(|&n| n > 0)
        .unwrap_or(info.frame_count);
    let interval = sample_interval(fps);

    info!(
        path = %input.display(),
        total_frames = total,
        fps,
        interval,
        rotation = %rotation,
        "Analyzing video"
    );

    // Sampled frames are queued upright and already reduced to the analysis
    // raster, so memory per sample does not depend on the source resolution.
    let mut work: Vec<(usize, RgbFrame)> = Vec::new();
    let mut count = 0usize;
    for _ in 0..FRAME_ITERATION_CEILING {
        match decoder.next_frame() {
            Ok(Some(frame)) => {
                count += 1;
                if count % interval == 0 {
                    let upright = rotate_frame(frame, rotation);
                    work.push((count, analysis_raster(&upright)));
                    reporter.report(&ProgressUpdate {
                        stage: PipelineStage::Analyzing,
                        progress: progress_fraction(count, total) * 50.0,
                        frames_processed: count,
                        total_frames: total,
                    });
                }
            }
            Ok(None) => break,
            Err(e) if !e.is_recoverable() => return Err(e),
            Err(e) => {
                if total > 0 && count >= total {
                    break;
                }
                warn!(frame = count + 1, error = %e, "Skipping undecodable frame");
            }
        }
    }
    drop(decoder);

    if work.is_empty() {
        return Err(DiveColorError::InsufficientData(input.to_path_buf()));
    }

    let threads = cores.min(work.len()).max(1);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    debug!(samples = work.len(), threads, "Estimating correction vectors");

    let mut samples: Vec<SampledEntry> = pool.install(|| {
        work.into_par_iter()
            .map(|(frame_index, raster)| SampledEntry {
                frame_index,
                vector: estimate_correction(&raster),
            })
            .collect()
    });
    samples.sort_by_key(|s| s.frame_index);

    info!(decoded = count, samples = samples.len(), "Analysis complete");

    AnalysisResult::new(AnalysisRecord {
        input_path: input.to_path_buf(),
        output_path: output.to_path_buf(),
        fps,
        total_frames: if total > 0 { total } else { count },
        samples,
        rotation,
        video_bitrate: probe.as_ref().and_then(|p| p.video_bitrate),
        audio_bitrate: probe.as_ref().and_then(|p| p.audio_bitrate),
    })
}
