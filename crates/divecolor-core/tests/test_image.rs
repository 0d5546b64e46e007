#[allow(dead_code)]
mod common;

use std::sync::Arc;

use divecolor_core::compute::{FilterApplicator, GpuCapability};
use divecolor_core::config::PerformanceStore;
use divecolor_core::error::DiveColorError;
use divecolor_core::frame::RgbFrame;
use divecolor_core::io::image_io::{load_rgb, save_rgb};
use divecolor_core::io::MediaIo;
use divecolor_core::pipeline::{correct_image, ColorCorrector, OutcomeStatus};

use common::{underwater_frame, MemoryMedia};

#[test]
fn test_gray_image_is_stretched() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("gray.png");
    let output = dir.path().join("gray_corrected.png");
    save_rgb(&RgbFrame::filled(64, 64, [128, 128, 128]), &input).unwrap();

    let outcome = correct_image(&FilterApplicator::cpu(), &input, &output).unwrap();
    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.output_path, output);

    let corrected = load_rgb(&output).unwrap();
    assert_eq!(corrected.dimensions(), RgbFrame::filled(64, 64, [0; 3]).dimensions());
    assert!(corrected.data.iter().all(|&v| v == 254));
}

#[test]
fn test_corrector_single_image() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("reef.png");
    let output = dir.path().join("reef_corrected.png");
    let frame = underwater_frame(48, 32);
    save_rgb(&frame, &input).unwrap();

    let store = Arc::new(PerformanceStore::with_environment(
        dir.path().join("performance.toml"),
        GpuCapability::none(),
        2,
    ));
    let media: Arc<dyn MediaIo> = Arc::new(MemoryMedia::new());
    let corrector = ColorCorrector::new(store, media);

    let outcome = corrector.correct_single_image(&input, &output).unwrap();
    assert!(outcome.message.contains("reef_corrected.png"), "got: {}", outcome.message);

    let corrected = load_rgb(&output).unwrap();
    assert_eq!(corrected.dimensions(), frame.dimensions());
    assert!(corrected.pixel(0, 0)[0] > frame.pixel(0, 0)[0]);
}

#[test]
fn test_missing_image_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = correct_image(
        &FilterApplicator::cpu(),
        &dir.path().join("missing.png"),
        &dir.path().join("out.png"),
    )
    .unwrap_err();
    assert!(matches!(err, DiveColorError::Input { .. }), "got: {err}");
    assert!(!dir.path().join("out.png").exists());
}
