use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use divecolor_core::pipeline::ProgressUpdate;

use super::{default_output, progress_bar, update_bar, user_error, Context};
use crate::summary::print_analysis_summary;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input video
    pub input: PathBuf,

    /// Corrected video path recorded in the analysis (default: <name>_corrected.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Where to save the analysis
    #[arg(long, default_value = "analysis.json")]
    pub save: PathBuf,
}

pub fn run(ctx: &Context, args: &AnalyzeArgs) -> Result<()> {
    let corrector = ctx.corrector()?;
    let output = args.output.clone().unwrap_or_else(|| default_output(&args.input));

    let pb = progress_bar()?;
    let reporter = |u: &ProgressUpdate| update_bar(&pb, u);
    let analysis = corrector
        .analyze(&args.input, &output, Some(&reporter))
        .map_err(user_error)?;
    pb.finish_with_message("Analysis complete");

    analysis
        .save_json(&args.save)
        .map_err(user_error)
        .with_context(|| format!("Failed to save analysis to {}", args.save.display()))?;

    print_analysis_summary(&analysis);
    println!("\nAnalysis saved to {}", args.save.display());
    println!("Run `divecolor process {}` to write the corrected video.", args.save.display());

    Ok(())
}
