//! Command-line interface definitions

pub mod run;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "audit-cli",
    about = "Reconcile periodic equipment meter-reading workbooks",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an audit over a previous and a current workbook
    Run(RunArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Previous period's workbook (.xlsx); prompted for when omitted
    #[arg(long)]
    pub previous: Option<PathBuf>,

    /// Current period's workbook (.xlsx); overwritten in place on success
    #[arg(long)]
    pub current: Option<PathBuf>,

    /// Directory artifacts are written to (overrides the config file)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Path to a config file (default: platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
