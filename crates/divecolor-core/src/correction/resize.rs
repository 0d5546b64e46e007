use ndarray::{Array3, ArrayView3};

use crate::consts::COLOR_CHANNEL_COUNT;

/// Source sample position for one destination coordinate, using pixel-center
/// alignment. Returns the two neighbouring source indices and the weight of the
/// second one.
fn source_taps(dst: usize, scale: f64, src_len: usize) -> (usize, usize, f64) {
    let pos = ((dst as f64 + 0.5) * scale - 0.5).max(0.0);
    let i0 = (pos.floor() as usize).min(src_len - 1);
    let i1 = (i0 + 1).min(src_len - 1);
    let frac = if i0 == src_len - 1 { 0.0 } else { pos - i0 as f64 };
    (i0, i1, frac)
}

/// Bilinear resize of an RGB raster to `(out_h, out_w)`.
pub fn resize_bilinear(src: ArrayView3<u8>, out_h: usize, out_w: usize) -> Array3<u8> {
    let (h, w, _) = src.dim();
    if (h, w) == (out_h, out_w) {
        return src.to_owned();
    }

    let scale_y = h as f64 / out_h as f64;
    let scale_x = w as f64 / out_w as f64;
    let rows: Vec<_> = (0..out_h).map(|y| source_taps(y, scale_y, h)).collect();
    let cols: Vec<_> = (0..out_w).map(|x| source_taps(x, scale_x, w)).collect();

    Array3::from_shape_fn((out_h, out_w, COLOR_CHANNEL_COUNT), |(y, x, c)| {
        let (y0, y1, fy) = rows[y];
        let (x0, x1, fx) = cols[x];
        let v00 = f64::from(src[[y0, x0, c]]);
        let v01 = f64::from(src[[y0, x1, c]]);
        let v10 = f64::from(src[[y1, x0, c]]);
        let v11 = f64::from(src[[y1, x1, c]]);
        let top = v00 * (1.0 - fx) + v01 * fx;
        let bottom = v10 * (1.0 - fx) + v11 * fx;
        (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
    })
}
