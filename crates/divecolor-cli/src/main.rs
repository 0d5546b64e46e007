mod commands;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use divecolor_core::consts::DEFAULT_PERFORMANCE_FILE;
use tracing_subscriber::EnvFilter;

use commands::Context;

#[derive(Parser)]
#[command(name = "divecolor", about = "Underwater color correction for videos and images")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Performance settings file (TOML)
    #[arg(long, global = true, default_value = DEFAULT_PERFORMANCE_FILE)]
    perf_config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a video and estimate correction vectors
    Analyze(commands::analyze::AnalyzeArgs),
    /// Write a corrected video from a saved analysis
    Process(commands::process::ProcessArgs),
    /// Analyze and process a video in one go
    Correct(commands::correct::CorrectArgs),
    /// Correct a single image
    Image(commands::image::ImageArgs),
    /// Show or change performance settings
    Config(commands::config::ConfigArgs),
    /// Show video metadata and detected rotation
    Info(commands::info::InfoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let ctx = Context {
        perf_config: cli.perf_config,
    };

    match &cli.command {
        Commands::Analyze(args) => commands::analyze::run(&ctx, args),
        Commands::Process(args) => commands::process::run(&ctx, args),
        Commands::Correct(args) => commands::correct::run(&ctx, args),
        Commands::Image(args) => commands::image::run(&ctx, args),
        Commands::Config(args) => commands::config::run(&ctx, args),
        Commands::Info(args) => commands::info::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "divecolor",
            "correct",
            "dive.mp4",
            "--perf-config",
            "/tmp/perf.toml",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.perf_config, PathBuf::from("/tmp/perf.toml"));
        match cli.command {
            Commands::Correct(args) => {
                assert_eq!(args.input, PathBuf::from("dive.mp4"));
                assert!(args.output.is_none());
            }
            _ => panic!("expected correct"),
        }
    }

    #[test]
    fn test_config_set_parses_values() {
        let cli = Cli::try_parse_from([
            "divecolor",
            "config",
            "set",
            "--batch-size",
            "48",
            "--use-gpu",
            "true",
            "--codec",
            "avc1",
        ])
        .unwrap();
        let Commands::Config(args) = cli.command else {
            panic!("expected config");
        };
        let commands::config::ConfigCommand::Set(set) = args.command else {
            panic!("expected set");
        };
        let update = set.to_update();
        assert_eq!(update.batch_size, Some(48));
        assert_eq!(update.use_gpu, Some(true));
        assert_eq!(update.codec, Some(divecolor_core::config::VideoCodec::H264));
        assert_eq!(update.max_processes, None);
    }

    #[test]
    fn test_unknown_codec_rejected() {
        assert!(Cli::try_parse_from(["divecolor", "config", "set", "--codec", "vp9"]).is_err());
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["divecolor", "analyze", "reef.mov"]).unwrap();
        assert_eq!(cli.perf_config, PathBuf::from(DEFAULT_PERFORMANCE_FILE));
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.save, PathBuf::from("analysis.json"));
    }
}
