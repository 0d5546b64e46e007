use ndarray::Axis;
use tracing::debug;

use crate::consts::{ANALYSIS_SIZE, BLUE_MAGIC_VALUE, COLOR_CHANNEL_COUNT, THRESHOLD_RATIO};
use crate::frame::RgbFrame;

use super::histogram::{channel_histogram, gain_and_offset, normalizing_interval};
use super::hue::{hue_shift_coefficients, red_contribution, search_hue_shift};
use super::resize::resize_bilinear;
use super::vector::{to_u8, CorrectionVector};

/// Estimate the correction vector for one frame.
///
/// The frame is reduced to a 256x256 working copy. A hue rotation is searched
/// that lifts the mean red level, the red channel is replaced by its rotated
/// value, and each channel is then stretched over its densely populated range.
pub fn estimate_correction(frame: &RgbFrame) -> CorrectionVector {
    let mut work = resize_bilinear(frame.data.view(), ANALYSIS_SIZE, ANALYSIS_SIZE);

    let mean = channel_means(&work);
    let hue_shift = search_hue_shift(mean);
    let degrees = f64::from(hue_shift);

    for mut px in work.lanes_mut(Axis(2)) {
        let rgb = [f64::from(px[0]), f64::from(px[1]), f64::from(px[2])];
        px[0] = to_u8(red_contribution(rgb, degrees));
    }

    let threshold = (ANALYSIS_SIZE * ANALYSIS_SIZE) as f64 / THRESHOLD_RATIO;
    let intervals: Vec<(usize, usize)> = (0..COLOR_CHANNEL_COUNT)
        .map(|c| normalizing_interval(&channel_histogram(&work, c), threshold))
        .collect();

    let (red_gain, red_offset) = gain_and_offset(intervals[0]);
    let green = gain_and_offset(intervals[1]);
    let blue = gain_and_offset(intervals[2]);

    let shifted = hue_shift_coefficients(degrees);
    let red_row = [
        shifted[0] * red_gain,
        shifted[1] * red_gain,
        shifted[2] * red_gain * BLUE_MAGIC_VALUE,
    ];

    debug!(
        hue_shift,
        mean_r = mean[0],
        mean_g = mean[1],
        mean_b = mean[2],
        red_interval = ?intervals[0],
        "Estimated correction"
    );

    CorrectionVector::new(red_row, red_offset, green, blue)
}

/// The 256x256 working copy the estimator reads. Estimating this raster gives
/// the same vector as estimating `frame` itself.
pub fn analysis_raster(frame: &RgbFrame) -> RgbFrame {
    RgbFrame {
        data: resize_bilinear(frame.data.view(), ANALYSIS_SIZE, ANALYSIS_SIZE),
    }
}

/// Per-channel mean, truncated to whole levels.
fn channel_means(data: &ndarray::Array3<u8>) -> [f64; 3] {
    let (h, w, _) = data.dim();
    let n = (h * w) as f64;
    let mut sums = [0u64; COLOR_CHANNEL_COUNT];
    for px in data.lanes(Axis(2)) {
        for (c, sum) in sums.iter_mut().enumerate() {
            *sum += u64::from(px[c]);
        }
    }
    sums.map(|s| (s as f64 / n).trunc())
}
