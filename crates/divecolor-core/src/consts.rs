use std::time::Duration;

/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Side length of the square the estimator downsamples every frame to.
pub const ANALYSIS_SIZE: usize = 256;

/// Histogram bins per channel.
pub const HISTOGRAM_BINS: usize = 256;

/// Divisor of the analysis pixel count giving the "sparse bin" population threshold.
pub const THRESHOLD_RATIO: f64 = 2000.0;

/// Mean red level the hue-shift search tries to reach.
pub const MIN_AVG_RED: f64 = 60.0;

/// Largest hue rotation (degrees) the search may reach.
pub const MAX_HUE_SHIFT: u32 = 120;

/// Extra weight applied to the red-from-blue cross term.
pub const BLUE_MAGIC_VALUE: f64 = 1.2;

/// Seconds of footage between two analyzed frames.
pub const SAMPLE_SECONDS: f64 = 1.0;

/// Hard cap on decode attempts in a single pass.
pub const FRAME_ITERATION_CEILING: usize = 1_000_000;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f64 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f64 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f64 = 0.114;

/// Number of scalars in a correction vector.
pub const VECTOR_LEN: usize = 20;

/// Number of channels in a frame (R, G, B).
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Batch size bounds for the synthesizer.
pub const MIN_BATCH_SIZE: usize = 1;
pub const MAX_BATCH_SIZE: usize = 128;

/// Encoder quality bounds (percent).
pub const MIN_VIDEO_QUALITY: u8 = 1;
pub const MAX_VIDEO_QUALITY: u8 = 100;

/// Target bit rates used when the source does not report one.
pub const DEFAULT_VIDEO_BITRATE: u64 = 5_000_000;
pub const DEFAULT_AUDIO_BITRATE: u64 = 128_000;

/// Wall-clock limit for the optional external re-encode.
pub const REENCODE_TIMEOUT: Duration = Duration::from_secs(300);

/// Frame rate assumed when the container reports none.
pub const FALLBACK_FPS: f64 = 30.0;

/// File name of the persisted performance configuration.
pub const DEFAULT_PERFORMANCE_FILE: &str = "performance.toml";
