use std::path::Path;

use tracing::info;

use crate::compute::FilterApplicator;
use crate::correction::estimate_correction;
use crate::error::Result;
use crate::io::image_io::{load_rgb, save_rgb};

use super::types::{ImageOutcome, OutcomeStatus};

/// Estimate and apply a correction to a single still image.
pub fn correct_image(
    applicator: &FilterApplicator,
    input: &Path,
    output: &Path,
) -> Result<ImageOutcome> {
    let frame = load_rgb(input)?;
    let vector = estimate_correction(&frame);
    let corrected = applicator.apply(&frame, &vector)?;
    save_rgb(&corrected, output)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        dims = %frame.dimensions(),
        device = applicator.backend_name(),
        "Image corrected"
    );

    Ok(ImageOutcome {
        status: OutcomeStatus::Success,
        output_path: output.to_path_buf(),
        message: format!("Corrected image saved to {}", output.display()),
    })
}
