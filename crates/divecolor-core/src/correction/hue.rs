//! Hue rotation of the red channel in YIQ-like space.
//!
//! Rotating by `h` degrees moves part of the green and blue energy into red,
//! which is what underwater footage lacks.

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R, MAX_HUE_SHIFT, MIN_AVG_RED};

/// Per-channel weights that map (R, G, B) onto the rotated red value.
pub fn hue_shift_coefficients(degrees: f64) -> [f64; 3] {
    let (w, u) = degrees.to_radians().sin_cos();
    [
        LUMINANCE_R + 0.701 * u + 0.168 * w,
        LUMINANCE_G - 0.587 * u + 0.330 * w,
        LUMINANCE_B - 0.114 * u - 0.497 * w,
    ]
}

/// Each channel's contribution to the rotated red value.
pub fn hue_shift_red(rgb: [f64; 3], degrees: f64) -> [f64; 3] {
    let c = hue_shift_coefficients(degrees);
    [rgb[0] * c[0], rgb[1] * c[1], rgb[2] * c[2]]
}

/// The rotated red value: sum of the three contributions.
#[inline]
pub fn red_contribution(rgb: [f64; 3], degrees: f64) -> f64 {
    hue_shift_red(rgb, degrees).iter().sum()
}

/// Find the hue rotation that lifts the mean red level to [`MIN_AVG_RED`].
///
/// The returned angle is one past the last angle evaluated, and is
/// `MAX_HUE_SHIFT + 1` when the target is never reached.
pub fn search_hue_shift(mean: [f64; 3]) -> u32 {
    let mut red = mean[0];
    let mut shift = 0u32;
    while red < MIN_AVG_RED {
        red = red_contribution(mean, f64::from(shift));
        shift += 1;
        if shift > MAX_HUE_SHIFT {
            red = MIN_AVG_RED;
        }
    }
    shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rotation_is_identity_on_red() {
        assert_eq!(hue_shift_coefficients(0.0), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bright_red_needs_no_shift() {
        assert_eq!(search_hue_shift([128.0, 128.0, 128.0]), 0);
        assert_eq!(search_hue_shift([60.0, 0.0, 0.0]), 0);
    }

    #[test]
    fn test_blue_heavy_hits_bound() {
        assert_eq!(search_hue_shift([21.0, 61.0, 160.0]), MAX_HUE_SHIFT + 1);
    }
}
