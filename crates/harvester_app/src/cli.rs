use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Harvest chapter-by-chapter corpora from public sources and check them
/// for consistency across versions.
#[derive(Debug, Parser)]
#[command(name = "harvester")]
pub struct Cli {
    /// Configuration file (RON).
    #[arg(short, long, default_value = "harvester.ron", global = true)]
    pub config: PathBuf,

    /// More log output; repeat for trace.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write the log to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every missing section of the configured versions.
    Harvest(HarvestArgs),
    /// Compare sub-unit counts across the versions stored under the root.
    Verify(VerifyArgs),
    /// Download the work list from the catalog API and save it as RON.
    Catalog(CatalogArgs),
}

#[derive(Debug, Args)]
pub struct HarvestArgs {
    /// Harvest only this version code; repeatable.
    #[arg(long = "version", value_name = "CODE")]
    pub versions: Vec<String>,

    /// Works harvested at the same time.
    #[arg(long, conflicts_with = "sequential")]
    pub concurrency: Option<usize>,

    /// One work after another, stopping at the first failure.
    #[arg(long)]
    pub sequential: bool,

    /// Output root, overriding the configuration.
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Output root, overriding the configuration.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Version shown first and preferred as the reference.
    #[arg(long, value_name = "CODE")]
    pub reference: Option<String>,

    /// Only print rows with a flagged cell.
    #[arg(long)]
    pub divergent_only: bool,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// API URL, overriding the configured one.
    #[arg(long)]
    pub url: Option<String>,

    /// Where to write the catalog.
    #[arg(short, long, default_value = "catalog.ron")]
    pub output: PathBuf,
}
