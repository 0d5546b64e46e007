use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use divecolor_core::config::{PerformanceConfig, PerformanceUpdate, VideoCodec};

use super::{user_error, Context};
use crate::summary::print_performance_info;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the current settings and detected hardware
    Show,
    /// Change one or more settings
    Set(SetArgs),
    /// Print the recommended defaults for this machine as TOML
    Defaults {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct SetArgs {
    /// Frames decoded per parallel batch (1-128)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Worker threads for correction (1-cores)
    #[arg(long)]
    pub max_processes: Option<usize>,

    /// Encoder quality in percent (1-100)
    #[arg(long)]
    pub video_quality: Option<u32>,

    /// Prefer the GPU filter backend
    #[arg(long)]
    pub use_gpu: Option<bool>,

    /// Output codec: mp4v, h264 or mjpeg
    #[arg(long, value_parser = parse_codec)]
    pub codec: Option<VideoCodec>,

    /// Re-encode at the source bit rates and keep the source audio
    #[arg(long)]
    pub external_reencode: Option<bool>,
}

impl SetArgs {
    pub fn to_update(&self) -> PerformanceUpdate {
        PerformanceUpdate {
            batch_size: self.batch_size,
            max_processes: self.max_processes,
            video_quality: self.video_quality,
            use_gpu: self.use_gpu,
            codec: self.codec,
            external_reencode: self.external_reencode,
        }
    }
}

fn parse_codec(s: &str) -> Result<VideoCodec, String> {
    s.parse().map_err(|e: divecolor_core::DiveColorError| e.to_string())
}

pub fn run(ctx: &Context, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommand::Show => {
            let store = ctx.store();
            print_performance_info(&store.info(), store.path());
        }
        ConfigCommand::Set(set) => {
            let store = ctx.store();
            store
                .configure(&set.to_update())
                .map_err(user_error)
                .with_context(|| format!("Failed to update {}", store.path().display()))?;
            print_performance_info(&store.info(), store.path());
            println!("\nSettings saved to {}", store.path().display());
        }
        ConfigCommand::Defaults { output } => {
            let toml_str = toml::to_string_pretty(&PerformanceConfig::default())?;
            if let Some(path) = output {
                std::fs::write(path, &toml_str)
                    .with_context(|| format!("Failed to write config to {}", path.display()))?;
                println!("Default config saved to {}", path.display());
            } else {
                print!("{}", toml_str);
            }
        }
    }
    Ok(())
}
