use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vstat",
    about = "vstat: keep version-control status of a working tree in sync",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan every file under a directory
    Status(StatusArgs),
    /// Refresh the state of specific files
    Refresh(PathsArgs),
    /// Stage files
    Add(PathsArgs),
    /// Stop tracking files (they stay on disk)
    Rm(PathsArgs),
    /// Restore files from HEAD
    Revert(PathsArgs),
    /// Show unstaged changes in files
    Diff(PathsArgs),
    /// Stage files and commit them
    Commit(CommitArgs),
    /// Show the current branch
    Branch(BranchArgs),
}

#[derive(Args)]
pub struct StatusArgs {
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
    /// Include up-to-date files
    #[arg(short, long)]
    pub all: bool,
    /// Give up waiting for the scan after this many seconds
    #[arg(long, default_value = "60")]
    pub timeout: u64,
}

#[derive(Args)]
pub struct PathsArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct CommitArgs {
    #[arg(short, long)]
    pub message: String,
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct BranchArgs {
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}
