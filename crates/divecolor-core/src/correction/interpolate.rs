use serde::{Deserialize, Serialize};

use super::vector::CorrectionVector;

/// A correction vector estimated from one sampled frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampledEntry {
    /// 1-based position of the frame in decode order.
    pub frame_index: usize,
    pub vector: CorrectionVector,
}

/// Correction vector for `frame_index`, linearly interpolated between the
/// neighbouring samples and clamped to the first/last sample outside their
/// range. `samples` must be sorted by strictly increasing index.
///
/// Returns `None` only when `samples` is empty.
pub fn interpolate_vector(samples: &[SampledEntry], frame_index: usize) -> Option<CorrectionVector> {
    let first = samples.first()?;
    let last = samples.last()?;
    if frame_index <= first.frame_index {
        return Some(first.vector);
    }
    if frame_index >= last.frame_index {
        return Some(last.vector);
    }

    // First sample strictly after `frame_index`; always in 1..len here.
    let upper = samples.partition_point(|s| s.frame_index <= frame_index);
    let hi = &samples[upper];
    let lo = &samples[upper - 1];
    if lo.frame_index == frame_index {
        return Some(lo.vector);
    }
    let t = (frame_index - lo.frame_index) as f64 / (hi.frame_index - lo.frame_index) as f64;
    Some(lo.vector.lerp(&hi.vector, t))
}
