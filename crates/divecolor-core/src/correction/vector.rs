use serde::{Deserialize, Serialize};

use crate::consts::VECTOR_LEN;

const RED_GAIN: usize = 0;
const RED_FROM_GREEN: usize = 1;
const RED_FROM_BLUE: usize = 2;
const RED_OFFSET: usize = 4;
const GREEN_GAIN: usize = 6;
const GREEN_OFFSET: usize = 9;
const BLUE_GAIN: usize = 12;
const BLUE_OFFSET: usize = 14;
const ALPHA: usize = 18;

/// A 20-scalar linear color transform laid out as a 4x5 matrix (RGBA rows,
/// RGBA + bias columns). Only the red row mixes channels; green and blue are
/// a gain plus a bias. Offsets are expressed in units of full scale (255).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectionVector(pub [f64; VECTOR_LEN]);

impl CorrectionVector {
    pub fn new(
        red_row: [f64; 3],
        red_offset: f64,
        green: (f64, f64),
        blue: (f64, f64),
    ) -> Self {
        let mut v = [0.0; VECTOR_LEN];
        v[RED_GAIN] = red_row[0];
        v[RED_FROM_GREEN] = red_row[1];
        v[RED_FROM_BLUE] = red_row[2];
        v[RED_OFFSET] = red_offset;
        v[GREEN_GAIN] = green.0;
        v[GREEN_OFFSET] = green.1;
        v[BLUE_GAIN] = blue.0;
        v[BLUE_OFFSET] = blue.1;
        v[ALPHA] = 1.0;
        Self(v)
    }

    /// The transform that leaves every pixel unchanged.
    pub fn identity() -> Self {
        Self::new([1.0, 0.0, 0.0], 0.0, (1.0, 0.0), (1.0, 0.0))
    }

    pub fn red_gain(&self) -> f64 {
        self.0[RED_GAIN]
    }

    pub fn red_from_green(&self) -> f64 {
        self.0[RED_FROM_GREEN]
    }

    pub fn red_from_blue(&self) -> f64 {
        self.0[RED_FROM_BLUE]
    }

    pub fn red_offset(&self) -> f64 {
        self.0[RED_OFFSET]
    }

    pub fn green_gain(&self) -> f64 {
        self.0[GREEN_GAIN]
    }

    pub fn green_offset(&self) -> f64 {
        self.0[GREEN_OFFSET]
    }

    pub fn blue_gain(&self) -> f64 {
        self.0[BLUE_GAIN]
    }

    pub fn blue_offset(&self) -> f64 {
        self.0[BLUE_OFFSET]
    }

    pub fn as_array(&self) -> &[f64; VECTOR_LEN] {
        &self.0
    }

    /// Component-wise linear blend: `self + (other - self) * t`.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let mut out = [0.0; VECTOR_LEN];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.0[i] + (other.0[i] - self.0[i]) * t;
        }
        Self(out)
    }

    /// Apply the transform to a single RGB triple, clipping and truncating to `u8`.
    #[inline]
    pub fn apply_pixel(&self, rgb: [u8; 3]) -> [u8; 3] {
        let [r, g, b] = rgb.map(f64::from);
        let v = &self.0;
        let r_out = r * v[RED_GAIN] + g * v[RED_FROM_GREEN] + b * v[RED_FROM_BLUE] + v[RED_OFFSET] * 255.0;
        let g_out = g * v[GREEN_GAIN] + v[GREEN_OFFSET] * 255.0;
        let b_out = b * v[BLUE_GAIN] + v[BLUE_OFFSET] * 255.0;
        [to_u8(r_out), to_u8(g_out), to_u8(b_out)]
    }
}

impl Default for CorrectionVector {
    fn default() -> Self {
        Self::identity()
    }
}

/// Clip to [0, 255] and truncate toward zero.
#[inline]
pub(crate) fn to_u8(v: f64) -> u8 {
    if v.is_nan() {
        0
    } else {
        v.clamp(0.0, 255.0) as u8
    }
}
