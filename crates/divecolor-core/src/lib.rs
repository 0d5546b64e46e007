//! Underwater color correction for photos and videos.
//!
//! Video runs in two passes: [`pipeline::analyze_video`] samples the footage and
//! estimates a correction vector per sample, then
//! [`pipeline::synthesize_video`] interpolates a vector for every frame and
//! writes the corrected stream. [`pipeline::ColorCorrector`] wraps both passes,
//! single-image correction and the persisted performance settings.

pub mod compute;
pub mod config;
pub mod consts;
pub mod correction;
pub mod error;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod rotation;

pub use error::{DiveColorError, Result};
