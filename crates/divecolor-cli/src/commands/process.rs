use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use divecolor_core::pipeline::{AnalysisResult, ProgressUpdate};

use super::{progress_bar, update_bar, user_error, Context};
use crate::summary::print_process_summary;

#[derive(Args)]
pub struct ProcessArgs {
    /// Analysis file written by `divecolor analyze`
    pub analysis: PathBuf,

    /// Override the output path stored in the analysis
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(ctx: &Context, args: &ProcessArgs) -> Result<()> {
    let mut analysis = AnalysisResult::load_json(&args.analysis)
        .map_err(user_error)
        .with_context(|| format!("Failed to load analysis {}", args.analysis.display()))?;
    if let Some(ref output) = args.output {
        analysis = analysis.with_output_path(output);
    }

    let corrector = ctx.corrector()?;
    let config = corrector.store().snapshot();

    let pb = progress_bar()?;
    let reporter = |u: &ProgressUpdate| update_bar(&pb, u);
    let outcome = corrector
        .process(analysis, Some(&reporter))
        .map_err(user_error)?;
    pb.finish_with_message("Done");

    print_process_summary(&outcome, &config);
    Ok(())
}
