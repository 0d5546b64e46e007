//! Color correction estimation: per-frame vectors and their interpolation.

pub mod estimate;
pub mod histogram;
pub mod hue;
pub mod interpolate;
pub mod resize;
pub mod vector;

pub use estimate::{analysis_raster, estimate_correction};
pub use interpolate::{interpolate_vector, SampledEntry};
pub use vector::CorrectionVector;
