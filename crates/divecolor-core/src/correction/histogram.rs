use ndarray::Array3;

use crate::consts::HISTOGRAM_BINS;

/// Count of pixels per 8-bit level for one channel.
pub fn channel_histogram(data: &Array3<u8>, channel: usize) -> [u32; HISTOGRAM_BINS] {
    let mut hist = [0u32; HISTOGRAM_BINS];
    for &v in data.index_axis(ndarray::Axis(2), channel).iter() {
        hist[v as usize] += 1;
    }
    hist
}

/// Find the stretch interval for one channel.
///
/// Levels whose population is below `threshold` keep their own value in the
/// candidate table, populated levels become 0, and level 255 is always kept.
/// The interval is the pair of adjacent table entries with the largest
/// positive jump, defaulting to `(0, 255)`.
pub fn normalizing_interval(hist: &[u32; HISTOGRAM_BINS], threshold: f64) -> (usize, usize) {
    let mut candidates = [0usize; HISTOGRAM_BINS];
    for (level, &count) in hist.iter().enumerate() {
        if f64::from(count) < threshold {
            candidates[level] = level;
        }
    }
    candidates[HISTOGRAM_BINS - 1] = HISTOGRAM_BINS - 1;

    let mut interval = (0, HISTOGRAM_BINS - 1);
    let mut max_dist = 0usize;
    for pair in candidates.windows(2) {
        if pair[1] > pair[0] && pair[1] - pair[0] > max_dist {
            max_dist = pair[1] - pair[0];
            interval = (pair[0], pair[1]);
        }
    }
    interval
}

/// Gain and offset that stretch `[low, high]` onto the full range.
pub fn gain_and_offset(interval: (usize, usize)) -> (f64, f64) {
    let (low, high) = interval;
    let width = high.saturating_sub(low).max(1) as f64;
    let gain = 256.0 / width;
    let offset = (-(low as f64) / 256.0) * gain;
    (gain, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_populated_level() {
        let mut hist = [0u32; HISTOGRAM_BINS];
        hist[128] = 65_536;
        assert_eq!(normalizing_interval(&hist, 32.768), (0, 129));
    }

    #[test]
    fn test_empty_histogram_defaults_to_steps_of_one() {
        let hist = [0u32; HISTOGRAM_BINS];
        // Every level is sparse: all jumps are 1, the first wins.
        assert_eq!(normalizing_interval(&hist, 32.768), (0, 1));
    }

    #[test]
    fn test_gain_and_offset() {
        let (gain, offset) = gain_and_offset((64, 192));
        assert_eq!(gain, 2.0);
        assert_eq!(offset, -0.5);
    }
}
