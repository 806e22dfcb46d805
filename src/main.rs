mod agents;
mod cli;
mod config;
mod error;
mod gradle;
mod maven;
mod props;
mod report;
mod repository;
mod utils;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;
use workflow::CheckOptions;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = cli.path.as_str();
    let result = match cli.command {
        Commands::Check {
            include_unstable,
            concurrency,
        } => {
            let options = CheckOptions {
                include_unstable,
                concurrency: concurrency.map(usize::from),
                show_progress: !cli.verbose,
            };
            workflow::execute_check(path, options).await
        }
        Commands::CheckGradle => workflow::execute_check_gradle(path).await,
        Commands::UpdateProps(args) => workflow::execute_update_props(path, args),
        Commands::UpdatePlugins(args) => workflow::execute_update_plugins(path, args),
        Commands::UpdateWrapper(args) => workflow::execute_update_wrapper(path, args),
        Commands::Update {
            args,
            include_unstable,
        } => {
            let options = CheckOptions {
                include_unstable,
                concurrency: None,
                show_progress: !cli.verbose,
            };
            workflow::execute_update(path, args, options).await
        }
        Commands::Report => workflow::execute_report(path),
        Commands::ClearReport => workflow::execute_clear_report(path),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
