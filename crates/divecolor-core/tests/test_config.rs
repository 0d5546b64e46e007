use divecolor_core::compute::{GpuBackendKind, GpuCapability};
use divecolor_core::config::{PerformanceConfig, PerformanceStore, PerformanceUpdate, VideoCodec};

fn store_in(dir: &tempfile::TempDir, cores: usize) -> PerformanceStore {
    PerformanceStore::with_environment(
        dir.path().join("performance.toml"),
        GpuCapability::none(),
        cores,
    )
}

#[test]
fn test_missing_file_gives_recommended_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, 8);
    assert_eq!(store.snapshot(), PerformanceConfig::recommended(8));
    let config = store.snapshot();
    assert_eq!(config.batch_size, 64);
    assert_eq!(config.max_processes, 8);
    assert_eq!(config.video_quality, 85);
    assert!(!config.use_gpu);
}

#[test]
fn test_single_core_defaults() {
    let config = PerformanceConfig::recommended(1);
    assert_eq!(config.batch_size, 16);
    assert_eq!(config.max_processes, 1);
    assert_eq!(config.video_quality, 75);
}

#[test]
fn test_out_of_range_updates_are_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, 4);
    let config = store
        .configure(&PerformanceUpdate {
            batch_size: Some(500),
            max_processes: Some(0),
            video_quality: Some(0),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(config.batch_size, 128);
    assert_eq!(config.max_processes, 1);
    assert_eq!(config.video_quality, 1);

    let config = store
        .configure(&PerformanceUpdate {
            max_processes: Some(64),
            video_quality: Some(1000),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(config.max_processes, 4);
    assert_eq!(config.video_quality, 100);
    // Untouched by the second update.
    assert_eq!(config.batch_size, 128);
}

#[test]
fn test_configuration_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = store_in(&dir, 8);
        store
            .configure(&PerformanceUpdate {
                batch_size: Some(12),
                use_gpu: Some(true),
                codec: Some(VideoCodec::Mjpeg),
                external_reencode: Some(true),
                ..Default::default()
            })
            .unwrap();
    }
    let reopened = store_in(&dir, 8);
    let config = reopened.snapshot();
    assert_eq!(config.batch_size, 12);
    assert!(config.use_gpu);
    assert_eq!(config.codec, VideoCodec::Mjpeg);
    assert!(config.external_reencode);
    assert_eq!(config.max_processes, 8);
}

#[test]
fn test_saved_values_are_clamped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("performance.toml"),
        "batch_size = 1000\nmax_processes = 99\n",
    )
    .unwrap();
    let config = store_in(&dir, 2).snapshot();
    assert_eq!(config.batch_size, 128);
    assert_eq!(config.max_processes, 2);
    // Missing keys take their defaults.
    assert_eq!(config.codec, VideoCodec::Mp4v);
}

#[test]
fn test_invalid_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("performance.toml"), "batch_size = [not toml").unwrap();
    assert_eq!(store_in(&dir, 4).snapshot(), PerformanceConfig::recommended(4));
}

#[test]
fn test_failed_write_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "a file, not a directory").unwrap();

    let store = PerformanceStore::with_environment(
        blocker.join("performance.toml"),
        GpuCapability::none(),
        4,
    );
    let before = store.snapshot();
    let result = store.configure(&PerformanceUpdate {
        batch_size: Some(7),
        ..Default::default()
    });
    assert!(result.is_err());
    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_info_reports_environment() {
    let dir = tempfile::tempdir().unwrap();
    let store = PerformanceStore::with_environment(
        dir.path().join("performance.toml"),
        GpuCapability::with_backend(GpuBackendKind::Vulkan),
        6,
    );
    let info = store.info();
    assert!(info.gpu.available);
    assert_eq!(info.gpu.backend, GpuBackendKind::Vulkan);
    assert_eq!(info.core_count, 6);
    assert_eq!(info.config, PerformanceConfig::recommended(6));
}

#[test]
fn test_codec_names() {
    assert_eq!("avc1".parse::<VideoCodec>().unwrap(), VideoCodec::H264);
    assert_eq!("MJPG".parse::<VideoCodec>().unwrap(), VideoCodec::Mjpeg);
    assert!("vp9".parse::<VideoCodec>().is_err());
    assert_eq!(VideoCodec::Mp4v.to_string(), "mp4v");
}
