use std::path::Path;

use image::ImageFormat;

use crate::error::{DiveColorError, Result};
use crate::frame::RgbFrame;

/// Load any format supported by `image` as 8-bit RGB.
pub fn load_rgb(path: &Path) -> Result<RgbFrame> {
    let img = image::open(path).map_err(|e| DiveColorError::input(path, e.to_string()))?;
    RgbFrame::from_rgb_image(&img.to_rgb8())
}

/// Save a frame, choosing format from file extension (JPEG when unknown).
pub fn save_rgb(frame: &RgbFrame, path: &Path) -> Result<()> {
    let img = frame.to_rgb_image()?;
    match ImageFormat::from_path(path) {
        Ok(format) => img.save_with_format(path, format)?,
        Err(_) => img.save_with_format(path, ImageFormat::Jpeg)?,
    }
    Ok(())
}
