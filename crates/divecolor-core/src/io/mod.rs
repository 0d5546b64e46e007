pub mod ffmpeg;
pub mod image_io;
pub mod media;
pub mod probe;

pub use ffmpeg::FfmpegMedia;
pub use media::{
    EncoderSettings, FrameDecoder, FrameEncoder, MediaIo, MediaProbe, ReencodeRequest, StreamInfo,
};
