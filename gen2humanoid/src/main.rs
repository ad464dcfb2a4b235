//! Main entry point for the g2h CLI

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use gen2humanoid::cli::{Cli, Commands};
use gen2humanoid::commands;
use gen2humanoid::config::Config;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Set verbosity
    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    let config = Config::load_or_default(cli.config.as_deref())?.with_project_root(cli.project_root);

    // Execute command
    match cli.command {
        Commands::Pipeline(args) => commands::pipeline::execute(&config, args),
        Commands::T2m(args) => commands::pipeline::execute_t2m(&config, &args),
        Commands::Convert(args) => commands::convert::execute(&config, &args),
        Commands::Retarget(args) => commands::pipeline::execute_retarget(&config, &args),
        Commands::Play(args) => commands::play::execute(&config, args),
        Commands::Mjcf { command } => commands::mjcf::execute(&config, command),
        Commands::Robots { paths_only } => commands::robots::execute(&config, paths_only),
        Commands::Config => commands::robots::print_config(&config),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
