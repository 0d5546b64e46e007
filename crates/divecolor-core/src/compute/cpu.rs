use ndarray::{Array3, ArrayView1, ArrayViewMut1, Axis, Zip};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::correction::CorrectionVector;
use crate::error::Result;
use crate::frame::RgbFrame;

use super::FilterBackend;

/// CPU backend using Rayon for parallelism.
pub struct CpuBackend;

impl FilterBackend for CpuBackend {
    fn name(&self) -> &str {
        "CPU/Rayon"
    }

    fn apply(&self, frame: &RgbFrame, vector: &CorrectionVector) -> Result<RgbFrame> {
        Ok(apply_filter(frame, vector))
    }
}

/// Apply `vector` to every pixel, in parallel for large frames.
pub fn apply_filter(frame: &RgbFrame, vector: &CorrectionVector) -> RgbFrame {
    let (h, w, c) = frame.data.dim();
    let mut out = Array3::<u8>::zeros((h, w, c));
    let zip = Zip::from(out.lanes_mut(Axis(2))).and(frame.data.lanes(Axis(2)));
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_for_each(|dst, src| apply_pixel(dst, src, vector));
    } else {
        zip.for_each(|dst, src| apply_pixel(dst, src, vector));
    }
    RgbFrame { data: out }
}

#[inline]
fn apply_pixel(mut dst: ArrayViewMut1<u8>, src: ArrayView1<u8>, vector: &CorrectionVector) {
    let px = vector.apply_pixel([src[0], src[1], src[2]]);
    dst[0] = px[0];
    dst[1] = px[1];
    dst[2] = px[2];
}
