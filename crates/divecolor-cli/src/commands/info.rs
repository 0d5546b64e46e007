use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use divecolor_core::io::{FfmpegMedia, MediaIo};
use divecolor_core::rotation::resolve_rotation;

use super::user_error;

#[derive(Args)]
pub struct InfoArgs {
    /// Input video
    pub file: PathBuf,

    /// Print the probe result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let media = FfmpegMedia::locate().map_err(user_error)?;
    let probe = media.probe(&args.file).map_err(user_error)?;
    let rotation = resolve_rotation(Some(&probe), &media, &args.file);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&probe)?);
        return Ok(());
    }

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}", probe.dimensions());
    println!("Upright:     {}", rotation.apply_to(probe.dimensions()));
    println!("Rotation:    {}", rotation);
    if let Some(fps) = probe.fps {
        println!("Frame rate:  {:.3} fps", fps);
    }
    if let Some(n) = probe.frame_count {
        println!("Frames:      {}", n);
    }
    if let Some(d) = probe.duration {
        println!("Duration:    {:.1} s", d);
    }
    if let Some(ref codec) = probe.codec {
        println!("Codec:       {}", codec);
    }
    if let Some(br) = probe.video_bitrate {
        println!("Video rate:  {:.0} kb/s", br as f64 / 1000.0);
    }
    if probe.has_audio {
        match probe.audio_bitrate {
            Some(br) => println!("Audio:       {:.0} kb/s", br as f64 / 1000.0),
            None => println!("Audio:       yes"),
        }
    } else {
        println!("Audio:       none");
    }

    Ok(())
}
