#[allow(dead_code)]
mod common;

use divecolor_core::compute::cpu::apply_filter;
use divecolor_core::correction::{analysis_raster, estimate_correction};
use divecolor_core::correction::hue::{red_contribution, search_hue_shift};
use divecolor_core::frame::RgbFrame;

use common::{noise_frame, underwater_frame};

#[test]
fn test_uniform_gray_stretches_to_254() {
    let frame = RgbFrame::filled(64, 64, [128, 128, 128]);
    let vector = estimate_correction(&frame);

    // Hue shift 0 keeps the red row pure.
    assert!((vector.red_from_green()).abs() < 1e-12, "got: {vector:?}");
    assert!((vector.red_from_blue()).abs() < 1e-12, "got: {vector:?}");
    assert!((vector.red_gain() - 256.0 / 129.0).abs() < 1e-9);

    let out = apply_filter(&frame, &vector);
    for px in out.data.lanes(ndarray::Axis(2)) {
        assert_eq!(px.to_vec(), vec![254, 254, 254]);
    }
}

#[test]
fn test_red_contribution_monotonic_for_green_dominant_means() {
    for mean in [[10.0, 100.0, 40.0], [0.0, 120.0, 60.0], [30.0, 140.0, 90.0]] {
        let mut prev = red_contribution(mean, 0.0);
        for h in 1..=120 {
            let cur = red_contribution(mean, h as f64);
            assert!(cur >= prev - 1e-9, "mean {mean:?} drops at {h}: {prev} -> {cur}");
            prev = cur;
        }
    }
}

#[test]
fn test_hue_search_bounds() {
    assert_eq!(search_hue_shift([200.0, 10.0, 10.0]), 0);
    assert_eq!(search_hue_shift([21.0, 61.0, 160.0]), 121);
}

#[test]
fn test_underwater_frame_gets_red_boost() {
    let frame = underwater_frame(64, 64);
    let vector = estimate_correction(&frame);
    let out = apply_filter(&frame, &vector);

    let mean_red_in = frame.data.index_axis(ndarray::Axis(2), 0).map(|&v| v as f64).mean().unwrap();
    let mean_red_out = out.data.index_axis(ndarray::Axis(2), 0).map(|&v| v as f64).mean().unwrap();
    assert!(
        mean_red_out > mean_red_in + 100.0,
        "got: {mean_red_in} -> {mean_red_out}"
    );

    // Green and blue are stretched towards the top of the range.
    let [_, g, b] = out.pixel(0, 0);
    assert!(g >= 240, "got: {g}");
    assert!(b >= 250, "got: {b}");
}

#[test]
fn test_estimate_is_deterministic() {
    let frame = noise_frame(300, 200, 7);
    let a = estimate_correction(&frame);
    let b = estimate_correction(&frame);
    assert_eq!(a, b);
}

#[test]
fn test_estimate_handles_tiny_frame() {
    let frame = RgbFrame::filled(1, 1, [0, 0, 0]);
    let vector = estimate_correction(&frame);
    assert!(vector.as_array().iter().all(|v| v.is_finite()));
}

#[test]
fn test_analysis_raster_gives_same_estimate() {
    let frame = noise_frame(1280, 720, 11);
    let raster = analysis_raster(&frame);
    assert_eq!((raster.width(), raster.height()), (256, 256));
    assert_eq!(estimate_correction(&raster), estimate_correction(&frame));
}
