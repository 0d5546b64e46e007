//! Boundary to the container/codec layer.
//!
//! The pipeline only talks to these traits, so tests can feed synthetic
//! streams and production code can shell out to FFmpeg.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::VideoCodec;
use crate::error::Result;
use crate::frame::{Dimensions, RgbFrame};

/// Container metadata for a video file.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MediaProbe {
    pub width: usize,
    pub height: usize,
    pub fps: Option<f64>,
    /// Frame count declared by the container, when it declares one.
    pub frame_count: Option<usize>,
    pub duration: Option<f64>,
    pub codec: Option<String>,
    /// Legacy `rotate` tag, clockwise degrees.
    pub rotate_tag: Option<f64>,
    /// Display-matrix rotation, counter-clockwise degrees.
    pub display_matrix_rotation: Option<f64>,
    pub video_bitrate: Option<u64>,
    pub audio_bitrate: Option<u64>,
    pub has_audio: bool,
}

impl MediaProbe {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// Properties of an opened decode stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamInfo {
    pub width: usize,
    pub height: usize,
    pub fps: f64,
    /// Estimated from duration and frame rate; may be 0 when unknown.
    pub frame_count: usize,
}

impl StreamInfo {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// Forward-only frame source.
pub trait FrameDecoder: Send {
    fn stream_info(&self) -> StreamInfo;

    /// `Ok(None)` at end of stream. A recoverable `Err` means this one frame
    /// could not be decoded and the caller may keep reading; any other error
    /// ends the stream.
    fn next_frame(&mut self) -> Result<Option<RgbFrame>>;
}

/// Ordered frame sink.
pub trait FrameEncoder: Send {
    fn write_frame(&mut self, frame: &RgbFrame) -> Result<()>;

    /// Flush and close the output.
    fn finish(self: Box<Self>) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncoderSettings {
    pub width: usize,
    pub height: usize,
    pub fps: f64,
    pub codec: VideoCodec,
    /// Quality in percent (1..=100).
    pub quality: u8,
}

/// Re-encode `corrected` into `destination` at the given bit rates, muxing
/// audio from `source` when it has any.
#[derive(Clone, Debug)]
pub struct ReencodeRequest {
    pub corrected: PathBuf,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub video_bitrate: u64,
    pub audio_bitrate: u64,
    pub timeout: Duration,
}

pub trait MediaIo: Send + Sync {
    fn probe(&self, path: &Path) -> Result<MediaProbe>;

    fn open_decoder(&self, path: &Path) -> Result<Box<dyn FrameDecoder>>;

    fn open_encoder(&self, path: &Path, settings: &EncoderSettings) -> Result<Box<dyn FrameEncoder>>;

    fn reencode(&self, request: &ReencodeRequest) -> Result<()>;
}
