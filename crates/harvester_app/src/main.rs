mod cli;
mod commands;
mod config;
mod logging;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use cli::{Cli, Command};
use config::AppConfig;
use logging::LogDestination;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let destination = match cli.log_file.clone() {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    logging::initialize(destination, logging::level_for(cli.verbose, cli.quiet));

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Command::Harvest(args) => {
            let summary = commands::harvest(&config, &args).await?;
            summary.print();
            Ok(if summary.failed.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Verify(args) => {
            print!("{}", commands::verify(&config, &args)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Catalog(args) => {
            let works = commands::catalog(&config, &args).await?;
            println!("saved {works} work(s) to {}", args.output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
