use serde::{Deserialize, Serialize};

use crate::consts::{MAX_BATCH_SIZE, MAX_VIDEO_QUALITY, MIN_BATCH_SIZE, MIN_VIDEO_QUALITY};
use crate::error::DiveColorError;

/// Output video codec written by the synthesizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    #[default]
    Mp4v,
    H264,
    Mjpeg,
}

impl std::fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mp4v => write!(f, "mp4v"),
            Self::H264 => write!(f, "h264"),
            Self::Mjpeg => write!(f, "mjpeg"),
        }
    }
}

impl std::str::FromStr for VideoCodec {
    type Err = DiveColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp4v" => Ok(Self::Mp4v),
            "h264" | "avc1" => Ok(Self::H264),
            "mjpeg" | "mjpg" => Ok(Self::Mjpeg),
            other => Err(DiveColorError::Config(format!("unknown codec '{other}'"))),
        }
    }
}

/// Tunables for the two video passes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Frames decoded before each parallel correction step (1..=128).
    pub batch_size: usize,
    /// Upper bound on correction worker threads (1..=cores).
    pub max_processes: usize,
    /// Encoder quality in percent (1..=100).
    pub video_quality: u8,
    /// Prefer a GPU filter backend when one is detected.
    pub use_gpu: bool,
    pub codec: VideoCodec,
    /// Re-encode the corrected video at the source bit rates, keeping its audio.
    pub external_reencode: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self::recommended(num_cpus::get())
    }
}

impl PerformanceConfig {
    /// Defaults tiered by the number of available cores.
    pub fn recommended(cores: usize) -> Self {
        let cores = cores.max(1);
        let (batch_size, max_processes, video_quality) = if cores >= 8 {
            (64, cores, 85)
        } else if cores >= 4 {
            (32, cores, 80)
        } else {
            (16, 1, 75)
        };
        Self {
            batch_size,
            max_processes,
            video_quality,
            use_gpu: false,
            codec: VideoCodec::Mp4v,
            external_reencode: false,
        }
    }

    /// Bring every field into its valid range.
    pub fn clamped(mut self, cores: usize) -> Self {
        self.batch_size = self.batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE);
        self.max_processes = self.max_processes.clamp(1, cores.max(1));
        self.video_quality = self.video_quality.clamp(MIN_VIDEO_QUALITY, MAX_VIDEO_QUALITY);
        self
    }

    /// Apply the fields present in `update`, then clamp.
    pub fn merged(&self, update: &PerformanceUpdate, cores: usize) -> Self {
        let mut next = self.clone();
        if let Some(v) = update.batch_size {
            next.batch_size = v;
        }
        if let Some(v) = update.max_processes {
            next.max_processes = v;
        }
        if let Some(v) = update.video_quality {
            next.video_quality = v.min(u32::from(MAX_VIDEO_QUALITY)) as u8;
        }
        if let Some(v) = update.use_gpu {
            next.use_gpu = v;
        }
        if let Some(v) = update.codec {
            next.codec = v;
        }
        if let Some(v) = update.external_reencode {
            next.external_reencode = v;
        }
        next.clamped(cores)
    }
}

/// A partial configuration change. `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct PerformanceUpdate {
    pub batch_size: Option<usize>,
    pub max_processes: Option<usize>,
    pub video_quality: Option<u32>,
    pub use_gpu: Option<bool>,
    pub codec: Option<VideoCodec>,
    pub external_reencode: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommended_tiers() {
        let big = PerformanceConfig::recommended(12);
        assert_eq!((big.batch_size, big.max_processes, big.video_quality), (64, 12, 85));
        let mid = PerformanceConfig::recommended(4);
        assert_eq!((mid.batch_size, mid.max_processes, mid.video_quality), (32, 4, 80));
        let small = PerformanceConfig::recommended(2);
        assert_eq!((small.batch_size, small.max_processes, small.video_quality), (16, 1, 75));
        assert!(!big.use_gpu && !mid.use_gpu && !small.use_gpu);
    }

    #[test]
    fn test_codec_parse() {
        assert_eq!("H264".parse::<VideoCodec>().unwrap(), VideoCodec::H264);
        assert!("vp9".parse::<VideoCodec>().is_err());
    }
}
