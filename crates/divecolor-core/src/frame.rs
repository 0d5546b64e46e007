use ndarray::{Array3, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::{DiveColorError, Result};

/// An 8-bit RGB raster.
/// Pixel data is row-major, shape = (height, width, 3), channel order R, G, B.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbFrame {
    pub data: Array3<u8>,
}

impl RgbFrame {
    pub fn new(data: Array3<u8>) -> Result<Self> {
        let (h, w, c) = data.dim();
        if h == 0 || w == 0 || c != COLOR_CHANNEL_COUNT {
            return Err(DiveColorError::InvalidDimensions {
                width: w,
                height: h,
            });
        }
        Ok(Self { data })
    }

    /// Build a frame from packed `rgb24` bytes.
    pub fn from_raw(width: usize, height: usize, bytes: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 || bytes.len() != width * height * COLOR_CHANNEL_COUNT {
            return Err(DiveColorError::InvalidDimensions { width, height });
        }
        let data = Array3::from_shape_vec((height, width, COLOR_CHANNEL_COUNT), bytes)
            .map_err(|_| DiveColorError::InvalidDimensions { width, height })?;
        Ok(Self { data })
    }

    /// A frame where every pixel has the same color.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let data = Array3::from_shape_fn((height, width, COLOR_CHANNEL_COUNT), |(_, _, c)| rgb[c]);
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn pixel(&self, row: usize, col: usize) -> [u8; 3] {
        let px: ArrayView1<u8> = self.data.slice(ndarray::s![row, col, ..]);
        [px[0], px[1], px[2]]
    }

    /// Packed `rgb24` bytes in row-major order.
    pub fn to_raw(&self) -> Vec<u8> {
        if let Some(slice) = self.data.as_slice() {
            slice.to_vec()
        } else {
            self.data.iter().copied().collect()
        }
    }

    pub fn from_rgb_image(img: &image::RgbImage) -> Result<Self> {
        Self::from_raw(img.width() as usize, img.height() as usize, img.as_raw().clone())
    }

    pub fn to_rgb_image(&self) -> Result<image::RgbImage> {
        let (w, h) = (self.width(), self.height());
        image::RgbImage::from_raw(w as u32, h as u32, self.to_raw())
            .ok_or(DiveColorError::InvalidDimensions {
                width: w,
                height: h,
            })
    }
}

/// Width and height of a frame, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
