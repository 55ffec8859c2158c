use anyhow::Result;
use clap::Parser;

mod audit;
mod cli;
mod config;
mod error;
mod sheet;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => cli::run::handle_run_command(args),
    }
}
