use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::compute::FilterApplicator;
use crate::config::PerformanceConfig;
use crate::consts::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_VIDEO_BITRATE, FRAME_ITERATION_CEILING, REENCODE_TIMEOUT,
};
use crate::correction::interpolate_vector;
use crate::error::Result;
use crate::frame::RgbFrame;
use crate::io::{EncoderSettings, FrameDecoder, MediaIo, ReencodeRequest};
use crate::rotation::rotate_frame;

use super::helpers::{open_decoder, progress_fraction, reencode_temp_path};
use super::types::{
    AnalysisResult, OutcomeStatus, PipelineStage, ProcessOutcome, ProgressReporter, ProgressUpdate,
};

/// Sequential decoder front-end shared by every batch of one run.
struct BatchReader {
    decoder: Box<dyn FrameDecoder>,
    total: usize,
    decoded: usize,
    attempts: usize,
    done: bool,
}

impl BatchReader {
    /// Decode up to `batch_size` frames, paired with their 1-based index.
    /// Corrupt frames are skipped; any other decoder error ends the run.
    fn next_batch(&mut self, batch_size: usize) -> Result<Vec<(usize, RgbFrame)>> {
        let mut batch = Vec::with_capacity(batch_size);
        while !self.done && batch.len() < batch_size {
            if self.attempts >= FRAME_ITERATION_CEILING {
                warn!(attempts = self.attempts, "Decode iteration ceiling reached");
                self.done = true;
                break;
            }
            self.attempts += 1;
            match self.decoder.next_frame() {
                Ok(Some(frame)) => {
                    self.decoded += 1;
                    batch.push((self.decoded, frame));
                }
                Ok(None) => self.done = true,
                Err(e) if !e.is_recoverable() => return Err(e),
                Err(e) => {
                    if self.total > 0 && self.decoded >= self.total {
                        self.done = true;
                    } else {
                        warn!(frame = self.decoded + 1, error = %e, "Skipping undecodable frame");
                    }
                }
            }
        }
        Ok(batch)
    }
}

/// Second pass: decode `analysis.input_path()` again, correct every frame with
/// its interpolated vector and write the result in decode order.
pub fn synthesize_video(
    media: &dyn MediaIo,
    applicator: &FilterApplicator,
    config: &PerformanceConfig,
    cores: usize,
    analysis: AnalysisResult,
    reporter: &dyn ProgressReporter,
) -> Result<ProcessOutcome> {
    let input = analysis.input_path();
    let output = analysis.output_path();
    let rotation = analysis.rotation();

    let decoder = open_decoder(media, input)?;
    let original_dimensions = decoder.stream_info().dimensions();
    let output_dimensions = rotation.apply_to(original_dimensions);

    let settings = EncoderSettings {
        width: output_dimensions.width,
        height: output_dimensions.height,
        fps: analysis.fps(),
        codec: config.codec,
        quality: config.video_quality,
    };
    let mut encoder = media.open_encoder(output, &settings)?;

    let threads = cores.min(config.max_processes).max(1);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let batch_size = config.batch_size.max(1);
    let total = analysis.total_frames();

    info!(
        input = %input.display(),
        output = %output.display(),
        total_frames = total,
        batch_size,
        threads,
        device = applicator.backend_name(),
        rotation = %rotation,
        "Processing video"
    );

    let mut reader = BatchReader {
        decoder,
        total,
        decoded: 0,
        attempts: 0,
        done: false,
    };
    let samples = analysis.samples();
    let mut written = 0usize;

    loop {
        let batch = reader.next_batch(batch_size)?;
        if batch.is_empty() {
            break;
        }
        debug!(frames = batch.len(), first = batch[0].0, "Correcting batch");

        let corrected: Vec<Result<RgbFrame>> = pool.install(|| {
            batch
                .into_par_iter()
                .map(|(frame_index, frame)| {
                    let upright = rotate_frame(frame, rotation);
                    let vector = interpolate_vector(samples, frame_index).unwrap_or_default();
                    applicator.apply(&upright, &vector)
                })
                .collect()
        });

        for frame in corrected {
            encoder.write_frame(&frame?)?;
            written += 1;
            reporter.report(&ProgressUpdate {
                stage: PipelineStage::Processing,
                progress: (50.0 + progress_fraction(written, total) * 50.0).min(100.0),
                frames_processed: written,
                total_frames: total,
            });
        }
    }
    drop(reader);
    encoder.finish()?;

    let reencoded = config.external_reencode && reencode_in_place(media, &analysis);

    info!(frames_written = written, output = %output.display(), "Processing complete");

    Ok(ProcessOutcome {
        status: OutcomeStatus::Success,
        output_path: output.to_path_buf(),
        rotation_applied: rotation,
        original_dimensions,
        output_dimensions,
        frames_written: written,
        reencoded,
    })
}

/// Re-encode the finished output at the source bit rates. On any failure the
/// unoptimized output is kept.
fn reencode_in_place(media: &dyn MediaIo, analysis: &AnalysisResult) -> bool {
    let output = analysis.output_path();
    let temp = reencode_temp_path(output);
    let request = ReencodeRequest {
        corrected: output.to_path_buf(),
        source: analysis.input_path().to_path_buf(),
        destination: temp.clone(),
        video_bitrate: analysis.video_bitrate().unwrap_or(DEFAULT_VIDEO_BITRATE),
        audio_bitrate: analysis.audio_bitrate().unwrap_or(DEFAULT_AUDIO_BITRATE),
        timeout: REENCODE_TIMEOUT,
    };

    let result = media
        .reencode(&request)
        .and_then(|()| std::fs::rename(&temp, output).map_err(Into::into));
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(output = %output.display(), error = %e, "Re-encode failed, keeping unoptimized output");
            remove_if_exists(&temp);
            false
        }
    }
}

fn remove_if_exists(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            debug!(path = %path.display(), error = %e, "Could not remove temporary file");
        }
    }
}
