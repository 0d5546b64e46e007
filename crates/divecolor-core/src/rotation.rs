//! Container rotation detection and frame rotation.

use std::path::Path;

use ndarray::s;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DiveColorError;
use crate::frame::{Dimensions, RgbFrame};
use crate::io::{MediaIo, MediaProbe};

/// Clockwise rotation needed to display a stream upright.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Snap any angle (degrees, clockwise) to the nearest quarter turn.
    pub fn from_degrees(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return Self::Deg0;
        }
        let quarter = (degrees.rem_euclid(360.0) / 90.0).round() as i64 % 4;
        match quarter {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::Deg90 => Self::Deg270,
            Self::Deg270 => Self::Deg90,
            other => other,
        }
    }

    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    pub fn apply_to(self, dims: Dimensions) -> Dimensions {
        if self.swaps_dimensions() {
            dims.swapped()
        } else {
            dims
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = DiveColorError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(DiveColorError::InvalidAnalysis(format!(
                "rotation must be 0, 90, 180 or 270 (got {other})"
            ))),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> Self {
        r.degrees()
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\u{b0}", self.degrees())
    }
}

/// Rotation declared by container metadata.
///
/// The `rotate` tag is clockwise and wins. The display matrix angle is
/// counter-clockwise, so it is negated. No metadata means 0.
pub fn rotation_from_metadata(probe: &MediaProbe) -> Rotation {
    if let Some(tag) = probe.rotate_tag {
        return Rotation::from_degrees(tag);
    }
    if let Some(ccw) = probe.display_matrix_rotation {
        return Rotation::from_degrees(-ccw);
    }
    Rotation::Deg0
}

/// Resolve the rotation for `path`, given the result of an earlier probe.
///
/// Successful probes are authoritative, including an explicit 0. Only when
/// metadata is unavailable is the stream opened and a portrait frame shape
/// taken to mean 90. Never fails; any error yields 0.
pub fn resolve_rotation(probe: Option<&MediaProbe>, media: &dyn MediaIo, path: &Path) -> Rotation {
    if let Some(probe) = probe {
        let rotation = rotation_from_metadata(probe);
        debug!(path = %path.display(), rotation = %rotation, "Rotation from metadata");
        return rotation;
    }

    match media.open_decoder(path) {
        Ok(decoder) => {
            let dims = decoder.stream_info().dimensions();
            let rotation = if dims.is_portrait() {
                Rotation::Deg90
            } else {
                Rotation::Deg0
            };
            debug!(path = %path.display(), %dims, rotation = %rotation, "Rotation from frame shape");
            rotation
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Rotation detection failed, assuming 0");
            Rotation::Deg0
        }
    }
}

/// Probe `path` and resolve its rotation.
pub fn detect_rotation(media: &dyn MediaIo, path: &Path) -> Rotation {
    match media.probe(path) {
        Ok(probe) => resolve_rotation(Some(&probe), media, path),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Metadata probe failed");
            resolve_rotation(None, media, path)
        }
    }
}

/// Rotate a frame clockwise.
pub fn rotate_frame(frame: RgbFrame, rotation: Rotation) -> RgbFrame {
    let data = match rotation {
        Rotation::Deg0 => return frame,
        Rotation::Deg90 => {
            let t = frame.data.permuted_axes([1, 0, 2]);
            t.slice(s![.., ..;-1, ..]).as_standard_layout().into_owned()
        }
        Rotation::Deg180 => frame
            .data
            .slice(s![..;-1, ..;-1, ..])
            .as_standard_layout()
            .into_owned(),
        Rotation::Deg270 => {
            let t = frame.data.permuted_axes([1, 0, 2]);
            t.slice(s![..;-1, .., ..]).as_standard_layout().into_owned()
        }
    };
    RgbFrame { data }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_degrees_snaps() {
        assert_eq!(Rotation::from_degrees(-90.0), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(450.0), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(179.0), Rotation::Deg180);
        assert_eq!(Rotation::from_degrees(44.0), Rotation::Deg0);
        assert_eq!(Rotation::from_degrees(359.0), Rotation::Deg0);
    }

    #[test]
    fn test_rotate_90_moves_top_left_to_top_right() {
        let mut frame = RgbFrame::filled(3, 2, [0, 0, 0]);
        frame.data[[0, 0, 0]] = 255;
        let rotated = rotate_frame(frame, Rotation::Deg90);
        assert_eq!(rotated.dimensions(), Dimensions { width: 2, height: 3 });
        assert_eq!(rotated.pixel(0, 1), [255, 0, 0]);
    }
}
