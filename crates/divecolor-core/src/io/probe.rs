//! FFprobe metadata parsing.

use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Stdio};

use serde::Deserialize;

use crate::error::{DiveColorError, Result};

use super::media::MediaProbe;

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<usize>,
    height: Option<usize>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
    bit_rate: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    side_data_list: Vec<FfprobeSideData>,
}

#[derive(Debug, Deserialize)]
struct FfprobeSideData {
    rotation: Option<f64>,
}

/// Run `ffprobe` on `path` and parse its report.
pub fn probe_file(ffprobe: &Path, path: &Path) -> Result<MediaProbe> {
    if !path.exists() {
        return Err(DiveColorError::input(path, "file not found"));
    }

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| DiveColorError::external("ffprobe", e.to_string()))?;

    if !output.status.success() {
        return Err(DiveColorError::external(
            "ffprobe",
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    parse_probe_output(&output.stdout)
}

/// Parse the JSON emitted by `ffprobe -print_format json -show_format -show_streams`.
pub fn parse_probe_output(json: &[u8]) -> Result<MediaProbe> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| DiveColorError::external("ffprobe", "no video stream found"))?;
    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    let format = probe.format.as_ref();
    let duration = parse_num::<f64>(video.duration.as_deref())
        .or_else(|| parse_num(format.and_then(|f| f.duration.as_deref())));
    let fps = video
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| video.r_frame_rate.as_deref().and_then(parse_frame_rate));
    let video_bitrate = parse_num::<u64>(video.bit_rate.as_deref())
        .or_else(|| parse_num(format.and_then(|f| f.bit_rate.as_deref())))
        .filter(|&b| b > 0);

    Ok(MediaProbe {
        width: video.width.unwrap_or(0),
        height: video.height.unwrap_or(0),
        fps,
        frame_count: parse_num::<usize>(video.nb_frames.as_deref()).filter(|&n| n > 0),
        duration,
        codec: video.codec_name.clone(),
        rotate_tag: video.tags.get("rotate").and_then(|r| r.trim().parse().ok()),
        display_matrix_rotation: video.side_data_list.iter().find_map(|s| s.rotation),
        video_bitrate,
        audio_bitrate: audio
            .and_then(|a| parse_num::<u64>(a.bit_rate.as_deref()))
            .filter(|&b| b > 0),
        has_audio: audio.is_some(),
    })
}

fn parse_num<T: std::str::FromStr>(s: Option<&str>) -> Option<T> {
    s.and_then(|v| v.trim().parse().ok())
}

/// Parse a frame rate string like "30000/1001" or "30".
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let fps = if let Some((num, den)) = rate.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return None;
        }
        num / den
    } else {
        rate.trim().parse().ok()?
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}
