//! Root CLI structure for g2h

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::convert::ConvertArgs;
use crate::commands::mjcf::MjcfCommands;
use crate::commands::pipeline::{PipelineArgs, RetargetArgs, T2mArgs};
use crate::commands::play::PlayArgs;

#[derive(Parser)]
#[command(name = "g2h")]
#[command(about = "Generate human motion from text and retarget it to humanoid robots", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "G2H_CONFIG")]
    pub config: Option<PathBuf>,

    /// Project root that relative configured paths resolve against
    #[arg(long, global = true, env = "G2H_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run text-to-motion, conversion and retargeting in sequence
    Pipeline(PipelineArgs),

    /// Generate human motion from text prompts
    T2m(T2mArgs),

    /// Convert generated motion to AMASS SMPL-X records
    Convert(ConvertArgs),

    /// Retarget SMPL-X records to a robot
    Retarget(RetargetArgs),

    /// Play robot and human motion side by side without a window
    Play(PlayArgs),

    /// Inspect MuJoCo robot descriptions
    Mjcf {
        #[command(subcommand)]
        command: MjcfCommands,
    },

    /// List registered robots
    Robots {
        /// Print only the resolved description paths
        #[arg(long)]
        paths_only: bool,
    },

    /// Print the effective configuration as YAML
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
