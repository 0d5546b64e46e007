use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use divecolor_core::error::{DiveColorError, Result};
use divecolor_core::frame::RgbFrame;
use divecolor_core::io::{
    EncoderSettings, FrameDecoder, FrameEncoder, MediaIo, MediaProbe, ReencodeRequest, StreamInfo,
};

/// A video held entirely in memory.
#[derive(Clone)]
pub struct SyntheticVideo {
    pub frames: Vec<RgbFrame>,
    pub fps: f64,
    /// Metadata returned by `probe`; `None` makes the probe fail.
    pub probe: Option<MediaProbe>,
    /// Decode attempts (1-based) that fail instead of producing a frame.
    pub decode_failures: Vec<usize>,
    /// Frame count the decoder advertises.
    pub advertised_frames: usize,
    /// Decode attempt (1-based) at which the decoder fails for good.
    pub fatal_failure: Option<usize>,
}

impl SyntheticVideo {
    pub fn new(frames: Vec<RgbFrame>, fps: f64) -> Self {
        let (w, h) = frames
            .first()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0));
        let probe = MediaProbe {
            width: w,
            height: h,
            fps: Some(fps),
            frame_count: Some(frames.len()),
            ..Default::default()
        };
        Self {
            advertised_frames: frames.len(),
            frames,
            fps,
            probe: Some(probe),
            decode_failures: Vec::new(),
            fatal_failure: None,
        }
    }

    pub fn with_probe(mut self, probe: Option<MediaProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_decode_failures(mut self, attempts: Vec<usize>) -> Self {
        self.decode_failures = attempts;
        self
    }

    pub fn with_fatal_failure(mut self, attempt: usize) -> Self {
        self.fatal_failure = Some(attempt);
        self
    }

    pub fn probe_mut(&mut self) -> &mut MediaProbe {
        self.probe.get_or_insert_with(MediaProbe::default)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReencodeBehavior {
    Succeed,
    Fail,
}

/// In-memory `MediaIo` for pipeline tests.
pub struct MemoryMedia {
    videos: Mutex<HashMap<PathBuf, SyntheticVideo>>,
    encoded: Arc<Mutex<HashMap<PathBuf, (EncoderSettings, Vec<RgbFrame>)>>>,
    pub reencode: ReencodeBehavior,
    pub reencode_requests: Mutex<Vec<ReencodeRequest>>,
    /// Write a placeholder file at the output path when an encoder finishes.
    pub write_outputs: bool,
}

impl MemoryMedia {
    pub fn new() -> Self {
        Self {
            videos: Mutex::new(HashMap::new()),
            encoded: Arc::new(Mutex::new(HashMap::new())),
            reencode: ReencodeBehavior::Succeed,
            reencode_requests: Mutex::new(Vec::new()),
            write_outputs: false,
        }
    }

    pub fn insert(&self, path: impl Into<PathBuf>, video: SyntheticVideo) {
        self.videos.lock().unwrap().insert(path.into(), video);
    }

    /// Frames written to `path`, if an encoder for it was finished.
    pub fn encoded_frames(&self, path: &Path) -> Option<Vec<RgbFrame>> {
        self.encoded.lock().unwrap().get(path).map(|(_, f)| f.clone())
    }

    pub fn encoder_settings(&self, path: &Path) -> Option<EncoderSettings> {
        self.encoded.lock().unwrap().get(path).map(|(s, _)| *s)
    }

    fn video(&self, path: &Path) -> Result<SyntheticVideo> {
        self.videos
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| DiveColorError::input(path, "no such synthetic video"))
    }
}

impl MediaIo for MemoryMedia {
    fn probe(&self, path: &Path) -> Result<MediaProbe> {
        self.video(path)?
            .probe
            .ok_or_else(|| DiveColorError::external("ffprobe", "probe unavailable"))
    }

    fn open_decoder(&self, path: &Path) -> Result<Box<dyn FrameDecoder>> {
        let video = self.video(path)?;
        let (width, height) = video
            .frames
            .first()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0));
        let mut events = VecDeque::new();
        let mut frames = video.frames.into_iter();
        let mut attempt = 0;
        loop {
            attempt += 1;
            if video.fatal_failure == Some(attempt) {
                events.push_back(DecodeEvent::Fatal);
                // Frames after a fatal error must never be reached.
                events.extend(frames.map(DecodeEvent::Frame));
                break;
            }
            if video.decode_failures.contains(&attempt) {
                events.push_back(DecodeEvent::Corrupt);
                continue;
            }
            match frames.next() {
                Some(f) => events.push_back(DecodeEvent::Frame(f)),
                None => break,
            }
        }
        Ok(Box::new(MemoryDecoder {
            info: StreamInfo {
                width,
                height,
                fps: video.fps,
                frame_count: video.advertised_frames,
            },
            events,
        }))
    }

    fn open_encoder(&self, path: &Path, settings: &EncoderSettings) -> Result<Box<dyn FrameEncoder>> {
        Ok(Box::new(MemoryEncoder {
            path: path.to_path_buf(),
            settings: *settings,
            frames: Vec::new(),
            sink: Arc::clone(&self.encoded),
            write_output: self.write_outputs,
        }))
    }

    fn reencode(&self, request: &ReencodeRequest) -> Result<()> {
        self.reencode_requests.lock().unwrap().push(request.clone());
        match self.reencode {
            ReencodeBehavior::Succeed => {
                std::fs::write(&request.destination, b"reencoded")?;
                Ok(())
            }
            ReencodeBehavior::Fail => {
                // Leave a partial file behind, like an interrupted encoder would.
                std::fs::write(&request.destination, b"partial")?;
                Err(DiveColorError::external("ffmpeg", "simulated failure"))
            }
        }
    }
}

enum DecodeEvent {
    Frame(RgbFrame),
    Corrupt,
    Fatal,
}

struct MemoryDecoder {
    info: StreamInfo,
    events: VecDeque<DecodeEvent>,
}

impl FrameDecoder for MemoryDecoder {
    fn stream_info(&self) -> StreamInfo {
        self.info
    }

    fn next_frame(&mut self) -> Result<Option<RgbFrame>> {
        match self.events.pop_front() {
            Some(DecodeEvent::Frame(frame)) => Ok(Some(frame)),
            Some(DecodeEvent::Corrupt) => Err(DiveColorError::FrameDecode {
                index: 0,
                reason: "simulated corruption".into(),
            }),
            Some(DecodeEvent::Fatal) => Err(DiveColorError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "simulated decoder crash",
            ))),
            None => Ok(None),
        }
    }
}

struct MemoryEncoder {
    path: PathBuf,
    settings: EncoderSettings,
    frames: Vec<RgbFrame>,
    sink: Arc<Mutex<HashMap<PathBuf, (EncoderSettings, Vec<RgbFrame>)>>>,
    write_output: bool,
}

impl FrameEncoder for MemoryEncoder {
    fn write_frame(&mut self, frame: &RgbFrame) -> Result<()> {
        assert_eq!(frame.width(), self.settings.width, "frame width mismatch");
        assert_eq!(frame.height(), self.settings.height, "frame height mismatch");
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        if self.write_output {
            std::fs::write(&self.path, b"corrected")?;
        }
        self.sink
            .lock()
            .unwrap()
            .insert(self.path.clone(), (self.settings, self.frames));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Frame builders
// ---------------------------------------------------------------------------

/// Blue-green underwater-looking frame: (20 + x%4, 60 + y%4, 160).
pub fn underwater_frame(width: usize, height: usize) -> RgbFrame {
    let data = ndarray::Array3::from_shape_fn((height, width, 3), |(y, x, c)| match c {
        0 => (20 + x % 4) as u8,
        1 => (60 + y % 4) as u8,
        _ => 160,
    });
    RgbFrame::new(data).unwrap()
}

/// Deterministic pseudo-random frame.
pub fn noise_frame(width: usize, height: usize, seed: u32) -> RgbFrame {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let data = ndarray::Array3::from_shape_simple_fn((height, width, 3), || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state >> 24) as u8
    });
    RgbFrame::new(data).unwrap()
}

/// Horizontal/vertical gradient, distinct per pixel position.
pub fn gradient_frame(width: usize, height: usize) -> RgbFrame {
    let data = ndarray::Array3::from_shape_fn((height, width, 3), |(y, x, c)| match c {
        0 => (x * 255 / width.max(1)) as u8,
        1 => (y * 255 / height.max(1)) as u8,
        _ => 120,
    });
    RgbFrame::new(data).unwrap()
}
