use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use divecolor_core::pipeline::ProgressUpdate;

use super::{default_output, progress_bar, update_bar, user_error, Context};
use crate::summary::print_process_summary;

#[derive(Args)]
pub struct CorrectArgs {
    /// Input video
    pub input: PathBuf,

    /// Output video (default: <name>_corrected.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(ctx: &Context, args: &CorrectArgs) -> Result<()> {
    let corrector = ctx.corrector()?;
    let config = corrector.store().snapshot();
    let output = args.output.clone().unwrap_or_else(|| default_output(&args.input));

    println!("Correcting {}", args.input.display());
    println!();

    let pb = progress_bar()?;
    let reporter = |u: &ProgressUpdate| update_bar(&pb, u);
    let outcome = corrector
        .correct_video(&args.input, &output, Some(&reporter))
        .map_err(user_error)?;
    pb.finish_with_message("Done");

    print_process_summary(&outcome, &config);
    Ok(())
}
