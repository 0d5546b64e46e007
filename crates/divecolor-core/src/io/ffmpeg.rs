//! FFmpeg-backed media I/O: rawvideo pipes in both directions.

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::VideoCodec;
use crate::consts::{COLOR_CHANNEL_COUNT, FALLBACK_FPS};
use crate::error::{DiveColorError, Result};
use crate::frame::RgbFrame;

use super::media::{
    EncoderSettings, FrameDecoder, FrameEncoder, MediaIo, MediaProbe, ReencodeRequest, StreamInfo,
};
use super::probe::probe_file;

const REENCODE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Media I/O through the `ffmpeg` and `ffprobe` executables.
#[derive(Clone, Debug)]
pub struct FfmpegMedia {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegMedia {
    /// Find `ffmpeg` and `ffprobe` on `PATH`.
    pub fn locate() -> Result<Self> {
        let ffmpeg = which::which("ffmpeg")
            .map_err(|_| DiveColorError::external("ffmpeg", "not found on PATH"))?;
        let ffprobe = which::which("ffprobe")
            .map_err(|_| DiveColorError::external("ffprobe", "not found on PATH"))?;
        debug!(ffmpeg = %ffmpeg.display(), ffprobe = %ffprobe.display(), "Located FFmpeg");
        Ok(Self { ffmpeg, ffprobe })
    }

    pub fn with_paths(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

impl FfmpegMedia {
    /// Stream properties from the banner `ffmpeg -i` prints on stderr.
    fn scan_stream(&self, path: &Path) -> Result<StreamInfo> {
        let output = Command::new(&self.ffmpeg)
            .args(["-hide_banner", "-nostdin", "-i"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| DiveColorError::input(path, format!("failed to run ffmpeg: {e}")))?;
        // Without an output file ffmpeg always exits non-zero; only the banner matters.
        let banner = String::from_utf8_lossy(&output.stderr);
        let info = parse_stream_banner(&banner)
            .ok_or_else(|| DiveColorError::input(path, "no video stream found"))?;
        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            "Stream info from ffmpeg banner"
        );
        Ok(info)
    }
}

impl MediaIo for FfmpegMedia {
    fn probe(&self, path: &Path) -> Result<MediaProbe> {
        probe_file(&self.ffprobe, path)
    }

    fn open_decoder(&self, path: &Path) -> Result<Box<dyn FrameDecoder>> {
        let info = match self.probe(path) {
            Ok(probe) if probe.width > 0 && probe.height > 0 => {
                let fps = probe.fps.unwrap_or(FALLBACK_FPS);
                StreamInfo {
                    width: probe.width,
                    height: probe.height,
                    fps,
                    frame_count: probe
                        .duration
                        .map(|d| frames_in(d, fps))
                        .unwrap_or(0),
                }
            }
            Err(e @ DiveColorError::Input { .. }) => return Err(e),
            Ok(_) => self.scan_stream(path)?,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ffprobe failed, reading stream info from ffmpeg");
                self.scan_stream(path)?
            }
        };
        let fps = info.fps;

        let mut child = Command::new(&self.ffmpeg)
            .args(decoder_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DiveColorError::input(path, format!("failed to spawn ffmpeg: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DiveColorError::input(path, "failed to open ffmpeg stdout"))?;

        debug!(path = %path.display(), width = info.width, height = info.height, fps, "Decoder opened");
        Ok(Box::new(FfmpegDecoder {
            child,
            stdout: BufReader::new(stdout),
            info,
            frame_bytes: info.width * info.height * COLOR_CHANNEL_COUNT,
            decoded: 0,
            finished: false,
        }))
    }

    fn open_encoder(&self, path: &Path, settings: &EncoderSettings) -> Result<Box<dyn FrameEncoder>> {
        let mut child = Command::new(&self.ffmpeg)
            .args(encoder_args(settings, path))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DiveColorError::Encode(format!("Failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DiveColorError::Encode("Failed to open ffmpeg stdin".into()))?;

        Ok(Box::new(FfmpegEncoder {
            child,
            stdin: Some(stdin),
            width: settings.width,
            height: settings.height,
        }))
    }

    fn reencode(&self, request: &ReencodeRequest) -> Result<()> {
        let mut child = Command::new(&self.ffmpeg)
            .args(reencode_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DiveColorError::external("ffmpeg", e.to_string()))?;

        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                if status.success() {
                    info!(
                        output = %request.destination.display(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Re-encode finished"
                    );
                    return Ok(());
                }
                return Err(DiveColorError::external(
                    "ffmpeg",
                    format!("re-encode exited with status: {status}"),
                ));
            }
            if start.elapsed() >= request.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(DiveColorError::external(
                    "ffmpeg",
                    format!("re-encode timed out after {}s", request.timeout.as_secs()),
                ));
            }
            std::thread::sleep(REENCODE_POLL_INTERVAL);
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

struct FfmpegDecoder {
    child: Child,
    stdout: BufReader<ChildStdout>,
    info: StreamInfo,
    frame_bytes: usize,
    decoded: usize,
    finished: bool,
}

impl FrameDecoder for FfmpegDecoder {
    fn stream_info(&self) -> StreamInfo {
        self.info
    }

    fn next_frame(&mut self) -> Result<Option<RgbFrame>> {
        if self.finished {
            return Ok(None);
        }
        let mut buf = vec![0u8; self.frame_bytes];
        let mut filled = 0;
        while filled < buf.len() {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // A broken pipe cannot recover; report this frame and end the stream.
                    self.finished = true;
                    return Err(DiveColorError::FrameDecode {
                        index: self.decoded + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if filled == 0 {
            self.finished = true;
            let _ = self.child.wait();
            return Ok(None);
        }
        if filled < buf.len() {
            self.finished = true;
            return Err(DiveColorError::FrameDecode {
                index: self.decoded + 1,
                reason: format!("truncated frame ({filled} of {} bytes)", buf.len()),
            });
        }

        self.decoded += 1;
        RgbFrame::from_raw(self.info.width, self.info.height, buf).map(Some)
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

struct FfmpegEncoder {
    child: Child,
    stdin: Option<ChildStdin>,
    width: usize,
    height: usize,
}

impl FrameEncoder for FfmpegEncoder {
    fn write_frame(&mut self, frame: &RgbFrame) -> Result<()> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(DiveColorError::Encode(format!(
                "frame is {}, encoder expects {}x{}",
                frame.dimensions(),
                self.width,
                self.height
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| DiveColorError::Encode("encoder already finished".into()))?;
        stdin
            .write_all(&frame.to_raw())
            .map_err(|e| DiveColorError::Encode(format!("Failed to write frame: {e}")))
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        // Close stdin to signal end-of-stream
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| DiveColorError::Encode(format!("Failed to wait for ffmpeg: {e}")))?;
        if !status.success() {
            return Err(DiveColorError::Encode(format!(
                "ffmpeg exited with status: {status}"
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.stdin.take().is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

// ---------------------------------------------------------------------------
// Stream banner
// ---------------------------------------------------------------------------

fn frames_in(duration: f64, fps: f64) -> usize {
    (duration * fps).round().max(0.0) as usize
}

/// Parse the first video stream out of `ffmpeg -i` stderr:
///
/// ```text
///   Duration: 00:01:02.50, start: 0.000000, bitrate: 9000 kb/s
///   Stream #0:0(und): Video: h264 (High), yuv420p(tv, bt709), 1920x1080, 8000 kb/s, 29.97 fps, 29.97 tbr
/// ```
fn parse_stream_banner(text: &str) -> Option<StreamInfo> {
    let stream = text
        .lines()
        .find(|l| l.contains("Stream #") && l.contains("Video:"))?;
    let fields: Vec<&str> = stream.split(',').map(str::trim).collect();

    let (width, height) = fields.iter().find_map(|f| {
        let token = f.split_whitespace().next()?;
        let (w, h) = token.split_once('x')?;
        let (w, h) = (w.parse::<usize>().ok()?, h.parse::<usize>().ok()?);
        (w > 0 && h > 0).then_some((w, h))
    })?;

    let rate = |suffix: &str| {
        fields.iter().find_map(|f| {
            let value = f.strip_suffix(suffix)?.trim().parse::<f64>().ok()?;
            (value.is_finite() && value > 0.0).then_some(value)
        })
    };
    let fps = rate(" fps").or_else(|| rate(" tbr")).unwrap_or(FALLBACK_FPS);

    let duration = text.lines().find_map(|l| {
        let rest = l.trim().strip_prefix("Duration:")?;
        parse_timestamp(rest.split(',').next()?.trim())
    });

    Some(StreamInfo {
        width,
        height,
        fps,
        frame_count: duration.map(|d| frames_in(d, fps)).unwrap_or(0),
    })
}

/// `HH:MM:SS.ss` to seconds.
fn parse_timestamp(s: &str) -> Option<f64> {
    let mut parts = s.split(':');
    let h: f64 = parts.next()?.parse().ok()?;
    let m: f64 = parts.next()?.parse().ok()?;
    let sec: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(h * 3600.0 + m * 60.0 + sec)
}

// ---------------------------------------------------------------------------
// Argument builders
// ---------------------------------------------------------------------------

fn decoder_args(input: &Path) -> Vec<String> {
    vec![
        "-v".into(),
        "error".into(),
        "-noautorotate".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-fps_mode".into(),
        "passthrough".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgb24".into(),
        "-".into(),
    ]
}

/// Map quality percent onto a "lower is better" codec scale `[best, worst]`.
fn quality_to_scale(quality: u8, best: u32, worst: u32) -> u32 {
    let q = u32::from(quality.clamp(1, 100)) - 1;
    let span = worst - best;
    worst - (q * span + 49) / 99
}

fn codec_args(codec: VideoCodec, quality: u8) -> Vec<String> {
    match codec {
        VideoCodec::Mp4v => vec![
            "-c:v".into(),
            "mpeg4".into(),
            "-q:v".into(),
            quality_to_scale(quality, 2, 31).to_string(),
            "-pix_fmt".into(),
            "yuv420p".into(),
        ],
        VideoCodec::H264 => vec![
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "medium".into(),
            "-crf".into(),
            quality_to_scale(quality, 18, 51).to_string(),
            "-pix_fmt".into(),
            "yuv420p".into(),
        ],
        VideoCodec::Mjpeg => vec![
            "-c:v".into(),
            "mjpeg".into(),
            "-q:v".into(),
            quality_to_scale(quality, 2, 31).to_string(),
            "-pix_fmt".into(),
            "yuvj420p".into(),
        ],
    }
}

fn encoder_args(settings: &EncoderSettings, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-v".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pixel_format".into(),
        "rgb24".into(),
        "-video_size".into(),
        format!("{}x{}", settings.width, settings.height),
        "-framerate".into(),
        format!("{}", settings.fps),
        "-i".into(),
        "pipe:0".into(),
    ];
    args.extend(codec_args(settings.codec, settings.quality));
    args.push(output.to_string_lossy().into_owned());
    args
}

fn reencode_args(request: &ReencodeRequest) -> Vec<String> {
    vec![
        "-y".into(),
        "-v".into(),
        "error".into(),
        "-i".into(),
        request.corrected.to_string_lossy().into_owned(),
        "-i".into(),
        request.source.to_string_lossy().into_owned(),
        "-map".into(),
        "0:v:0".into(),
        "-map".into(),
        "1:a:0?".into(),
        "-c:v".into(),
        "libx264".into(),
        "-b:v".into(),
        request.video_bitrate.to_string(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-c:a".into(),
        "aac".into(),
        "-b:a".into(),
        request.audio_bitrate.to_string(),
        "-movflags".into(),
        "+faststart".into(),
        request.destination.to_string_lossy().into_owned(),
    ]
}
