#[allow(dead_code)]
mod common;

use std::path::Path;

use divecolor_core::frame::Dimensions;
use divecolor_core::io::MediaProbe;
use divecolor_core::rotation::{detect_rotation, rotate_frame, rotation_from_metadata, Rotation};

use common::{gradient_frame, noise_frame, MemoryMedia, SyntheticVideo};

const ALL: [Rotation; 4] = [
    Rotation::Deg0,
    Rotation::Deg90,
    Rotation::Deg180,
    Rotation::Deg270,
];

#[test]
fn test_rotate_then_inverse_restores_frame() {
    let frame = noise_frame(7, 4, 42);
    for r in ALL {
        let back = rotate_frame(rotate_frame(frame.clone(), r), r.inverse());
        assert_eq!(back, frame, "rotation {r}");
    }
}

#[test]
fn test_rotate_90_is_clockwise() {
    let frame = gradient_frame(4, 2);
    let rotated = rotate_frame(frame.clone(), Rotation::Deg90);
    assert_eq!(rotated.dimensions(), Dimensions { width: 2, height: 4 });
    // Bottom-left of the source becomes top-left.
    assert_eq!(rotated.pixel(0, 0), frame.pixel(1, 0));
    // Top-left of the source becomes top-right.
    assert_eq!(rotated.pixel(0, 1), frame.pixel(0, 0));
}

#[test]
fn test_rotation_dimensions() {
    let dims = Dimensions { width: 1920, height: 1080 };
    assert_eq!(Rotation::Deg90.apply_to(dims), Dimensions { width: 1080, height: 1920 });
    assert_eq!(Rotation::Deg180.apply_to(dims), dims);
}

// ----------------------------------------------------------------------------
// Metadata
// ----------------------------------------------------------------------------

#[test]
fn test_rotate_tag_wins_over_display_matrix() {
    let probe = MediaProbe {
        rotate_tag: Some(180.0),
        display_matrix_rotation: Some(90.0),
        ..Default::default()
    };
    assert_eq!(rotation_from_metadata(&probe), Rotation::Deg180);
}

#[test]
fn test_display_matrix_is_counter_clockwise() {
    let probe = MediaProbe {
        display_matrix_rotation: Some(-90.0),
        ..Default::default()
    };
    assert_eq!(rotation_from_metadata(&probe), Rotation::Deg90);

    let probe = MediaProbe {
        display_matrix_rotation: Some(90.0),
        ..Default::default()
    };
    assert_eq!(rotation_from_metadata(&probe), Rotation::Deg270);
}

#[test]
fn test_explicit_zero_on_portrait_stream_stays_zero() {
    let media = MemoryMedia::new();
    let mut video = SyntheticVideo::new(vec![gradient_frame(4, 8)], 30.0);
    video.probe_mut().rotate_tag = Some(0.0);
    media.insert("portrait.mp4", video);
    assert_eq!(detect_rotation(&media, Path::new("portrait.mp4")), Rotation::Deg0);
}

#[test]
fn test_portrait_shape_used_when_probe_fails() {
    let media = MemoryMedia::new();
    let video = SyntheticVideo::new(vec![gradient_frame(4, 8)], 30.0).with_probe(None);
    media.insert("portrait.mp4", video);
    assert_eq!(detect_rotation(&media, Path::new("portrait.mp4")), Rotation::Deg90);
}

#[test]
fn test_landscape_shape_used_when_probe_fails() {
    let media = MemoryMedia::new();
    let video = SyntheticVideo::new(vec![gradient_frame(8, 4)], 30.0).with_probe(None);
    media.insert("landscape.mp4", video);
    assert_eq!(detect_rotation(&media, Path::new("landscape.mp4")), Rotation::Deg0);
}

#[test]
fn test_unreadable_file_gives_zero() {
    let media = MemoryMedia::new();
    assert_eq!(detect_rotation(&media, Path::new("missing.mp4")), Rotation::Deg0);
}

#[test]
fn test_rotation_serializes_as_degrees() {
    assert_eq!(serde_json::to_string(&Rotation::Deg90).unwrap(), "90");
    let r: Rotation = serde_json::from_str("270").unwrap();
    assert_eq!(r, Rotation::Deg270);
    assert!(serde_json::from_str::<Rotation>("45").is_err());
}
