//! Generator output to AMASS SMPL-X conversion

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use g2h_motion::ConversionSummary;

use crate::config::Config;
use crate::utils::clip_progress;

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Generator output directory
    pub input_dir: PathBuf,

    /// Destination for SMPL-X records
    pub output_dir: PathBuf,

    /// Sub-folder of the input that holds the clips (defaults to the configured one)
    #[arg(long)]
    pub prompt_folder: Option<String>,

    /// Frame rate for clips that do not record one
    #[arg(long)]
    pub frame_rate: Option<f32>,
}

/// Convert every clip below `input_dir/prompt_folder` with a progress bar
pub fn run_conversion(
    input_dir: &Path,
    prompt_folder: &str,
    output_dir: &Path,
    frame_rate: Option<f32>,
) -> Result<ConversionSummary> {
    let pb = clip_progress("Converting");
    let summary = g2h_motion::convert_directory(
        input_dir,
        prompt_folder,
        output_dir,
        frame_rate,
        |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        },
    )
    .with_context(|| {
        format!(
            "Failed to convert clips from {}",
            input_dir.join(prompt_folder).display()
        )
    })?;
    pb.finish_and_clear();
    Ok(summary)
}

pub fn print_summary(summary: &ConversionSummary, output_dir: &Path) {
    for failure in &summary.failures {
        println!("✗ {}: {}", failure.input.display(), failure.error);
    }
    println!(
        "Converted {}/{} clips",
        summary.converted(),
        summary.total()
    );
    println!("Output directory: {}", output_dir.display());
}

pub fn execute(config: &Config, args: &ConvertArgs) -> Result<()> {
    let prompt_folder = args
        .prompt_folder
        .as_deref()
        .unwrap_or(&config.prompt_folder);

    let summary = run_conversion(&args.input_dir, prompt_folder, &args.output_dir, args.frame_rate)?;
    print_summary(&summary, &args.output_dir);

    if !summary.is_complete() {
        bail!(
            "{} of {} clips failed to convert",
            summary.failures.len(),
            summary.total()
        );
    }
    Ok(())
}
