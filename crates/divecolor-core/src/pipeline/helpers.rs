use std::path::{Path, PathBuf};

use crate::error::{DiveColorError, Result};
use crate::io::{FrameDecoder, MediaIo};

/// Open a decoder, reporting any failure as an input error.
pub(super) fn open_decoder(media: &dyn MediaIo, path: &Path) -> Result<Box<dyn FrameDecoder>> {
    media.open_decoder(path).map_err(|e| match e {
        DiveColorError::Input { .. } => e,
        other => DiveColorError::input(path, other.to_string()),
    })
}

/// `done / total` clamped to [0, 1]; 0 when the total is unknown.
pub(super) fn progress_fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (done as f64 / total as f64).min(1.0)
    }
}

/// Sibling path used while re-encoding `output`: `clip.mp4` -> `clip.reencode.mp4`.
pub(super) fn reencode_temp_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    let name = match output.extension() {
        Some(ext) => format!("{stem}.reencode.{}", ext.to_string_lossy()),
        None => format!("{stem}.reencode"),
    };
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reencode_temp_path() {
        assert_eq!(
            reencode_temp_path(Path::new("/tmp/dive/clip.mp4")),
            PathBuf::from("/tmp/dive/clip.reencode.mp4")
        );
        assert_eq!(reencode_temp_path(Path::new("clip")), PathBuf::from("clip.reencode"));
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(5, 10), 0.5);
        assert_eq!(progress_fraction(12, 10), 1.0);
        assert_eq!(progress_fraction(3, 0), 0.0);
    }
}
