//! Text-to-motion and retargeting stages, and the full pipeline
//!
//! Both external stages run as Python scripts inside their own checkouts, so
//! every path handed to them is made absolute first.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use log::{info, warn};

use crate::commands::convert::{print_summary, run_conversion};
use crate::config::Config;
use crate::utils::{CommandLine, run_subprocess};

/// Text-to-motion generator checkpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum T2mModel {
    #[value(name = "HY-Motion-1.0")]
    HyMotion,
    #[value(name = "HY-Motion-1.0-Lite")]
    HyMotionLite,
}

impl T2mModel {
    /// Checkpoint directory name under the configured checkpoint dir
    pub fn checkpoint_name(self) -> &'static str {
        match self {
            Self::HyMotion => "HY-Motion-1.0",
            Self::HyMotionLite => "HY-Motion-1.0-Lite",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct T2mArgs {
    /// Prompt file or directory of prompt files
    #[arg(long, default_value = "data/t2m/example_subset.json")]
    pub input_text_dir: PathBuf,

    /// Directory the generator writes clips to
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Generator checkpoint
    #[arg(long, value_enum, default_value = "HY-Motion-1.0")]
    pub t2m_model: T2mModel,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RetargetArgs {
    /// Directory of SMPL-X records
    #[arg(long)]
    pub src_folder: PathBuf,

    /// Destination for robot motion records
    #[arg(long)]
    pub tgt_folder: PathBuf,

    /// Robot name known to the retargeter
    #[arg(long)]
    pub robot: String,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Prompt file or directory of prompt files
    #[arg(long, default_value = "data/t2m/example_subset.json")]
    pub input_text_dir: PathBuf,

    /// Generator output directory
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Generator checkpoint
    #[arg(long, value_enum, default_value = "HY-Motion-1.0")]
    pub t2m_model: T2mModel,

    /// Directory for converted SMPL-X records
    #[arg(long)]
    pub src_folder: PathBuf,

    /// Directory for retargeted robot motion
    #[arg(long)]
    pub tgt_folder: PathBuf,

    /// Robot name known to the retargeter
    #[arg(long)]
    pub robot_type: String,

    /// Frame rate for clips that do not record one
    #[arg(long)]
    pub frame_rate: Option<f32>,

    /// Print the stage commands instead of running them
    #[arg(long)]
    pub dry_run: bool,
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path: {}", path.display()))
}

/// Generator invocation, run from the generator checkout
pub fn t2m_command(
    config: &Config,
    model: T2mModel,
    input_text_dir: &Path,
    output_dir: &Path,
) -> Result<CommandLine> {
    Ok(CommandLine::new(&config.python)
        .arg(config.generator_dir().join("local_infer.py"))
        .option(
            "--model_path",
            absolute(&config.checkpoint_dir().join(model.checkpoint_name()))?,
        )
        .option("--input_text_dir", absolute(input_text_dir)?)
        .option("--output_dir", absolute(output_dir)?))
}

/// Retargeter invocation, run from the retargeter checkout
pub fn retarget_command(
    config: &Config,
    robot: &str,
    src_folder: &Path,
    tgt_folder: &Path,
) -> Result<CommandLine> {
    Ok(CommandLine::new(&config.python)
        .arg(
            config
                .retargeter_dir()
                .join("scripts")
                .join("smplx_to_robot_dataset.py"),
        )
        .option("--src_folder", absolute(src_folder)?)
        .option("--robot", robot)
        .option("--tgt_folder", absolute(tgt_folder)?))
}

fn run_or_print(command: &CommandLine, cwd: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        println!("(cd {} && {})", cwd.display(), command.display());
        return Ok(());
    }
    if !cwd.is_dir() {
        bail!("Working directory not found: {}", cwd.display());
    }
    run_subprocess(command, cwd)
}

fn check_robot(config: &Config, robot: &str) {
    if !config.robots.contains_key(robot) {
        warn!(
            "Robot '{}' is not in the registry; passing it to the retargeter as is",
            robot
        );
    }
}

pub fn execute_t2m(config: &Config, args: &T2mArgs) -> Result<()> {
    let command = t2m_command(config, args.t2m_model, &args.input_text_dir, &args.output_dir)?;
    run_or_print(&command, &config.generator_dir(), args.dry_run)
}

pub fn execute_retarget(config: &Config, args: &RetargetArgs) -> Result<()> {
    check_robot(config, &args.robot);
    let command = retarget_command(config, &args.robot, &args.src_folder, &args.tgt_folder)?;
    run_or_print(&command, &config.retargeter_dir(), args.dry_run)
}

pub fn execute(config: &Config, args: PipelineArgs) -> Result<()> {
    check_robot(config, &args.robot_type);

    info!("Step 1/3: generating motion with {}", args.t2m_model.checkpoint_name());
    let t2m = t2m_command(config, args.t2m_model, &args.input_text_dir, &args.output_dir)?;
    run_or_print(&t2m, &config.generator_dir(), args.dry_run)?;

    info!("Step 2/3: converting to SMPL-X");
    if args.dry_run {
        println!(
            "convert {} -> {}",
            args.output_dir.join(&config.prompt_folder).display(),
            args.src_folder.display()
        );
    } else {
        let summary = run_conversion(
            &args.output_dir,
            &config.prompt_folder,
            &args.src_folder,
            args.frame_rate,
        )?;
        print_summary(&summary, &args.src_folder);
        if summary.converted() == 0 {
            bail!(
                "No clips converted from {}",
                args.output_dir.join(&config.prompt_folder).display()
            );
        }
    }

    info!("Step 3/3: retargeting to {}", args.robot_type);
    let retarget = retarget_command(config, &args.robot_type, &args.src_folder, &args.tgt_folder)?;
    run_or_print(&retarget, &config.retargeter_dir(), args.dry_run)?;

    if !args.dry_run {
        println!("Robot motion written to {}", args.tgt_folder.display());
    }
    Ok(())
}
