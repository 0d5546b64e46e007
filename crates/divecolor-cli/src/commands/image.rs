use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use divecolor_core::compute::{create_backend, FilterApplicator};
use divecolor_core::pipeline::correct_image;

use super::{default_output, user_error, Context};

#[derive(Args)]
pub struct ImageArgs {
    /// Input image
    pub input: PathBuf,

    /// Output image (default: <name>_corrected.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Images need no FFmpeg, so this bypasses the video corrector.
pub fn run(ctx: &Context, args: &ImageArgs) -> Result<()> {
    let store = ctx.store();
    let config = store.snapshot();
    let applicator = FilterApplicator::new(create_backend(config.use_gpu, store.gpu()));
    let output = args.output.clone().unwrap_or_else(|| default_output(&args.input));

    let outcome = correct_image(&applicator, &args.input, &output).map_err(user_error)?;
    println!("{}", outcome.message);
    Ok(())
}
