//! Run command handler
//!
//! Owns all presentation: prompts for input paths, spawns the audit on a
//! worker thread, drains the event channel onto the terminal, and renders
//! the terminal status. The pipeline itself never prints.

use anyhow::{Context, Result, bail};
use colored::*;
use dialoguer::Input;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use crate::audit::{AuditEvent, EventSink, run_audit};
use crate::config::AuditConfig;

use super::RunArgs;

pub fn handle_run_command(args: RunArgs) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let mut config = AuditConfig::load(args.config.as_deref())?;
    if let Some(log_dir) = args.log_dir {
        config.log_dir = log_dir;
    }

    let previous = resolve_path(args.previous, "Previous file")?;
    let current = resolve_path(args.current, "Current file")?;

    // One worker, one unbounded channel; the terminal stays responsive while
    // the audit runs. No cancellation once started.
    let (tx, rx) = mpsc::channel();
    let sink = EventSink::new(tx);
    let worker = {
        let previous = previous.clone();
        let current = current.clone();
        let config = config.clone();
        thread::spawn(move || run_audit(&previous, &current, &config, &sink))
    };

    // Ends when the worker drops its sender.
    for event in rx {
        match event {
            AuditEvent::Log(line) => println!("{}", line),
            AuditEvent::Progress(percent) => {
                println!("{}", format!("Progress: {}%", percent).dimmed());
            }
            AuditEvent::RowCountMismatch {
                previous_rows,
                current_rows,
            } => {
                eprintln!(
                    "{}",
                    format!(
                        "Row counts differ: previous has {} data rows, current has {}",
                        previous_rows, current_rows
                    )
                    .yellow()
                );
            }
        }
    }

    let result = worker
        .join()
        .map_err(|_| anyhow::anyhow!("Audit worker panicked"))?;

    match result {
        Ok(summary) => {
            println!("{}", "Audit completed.".green());
            println!("  Matched serials:    {}", summary.matched);
            println!("  Unmatched serials:  {}", summary.unmatched);
            println!("  Duplicates removed: {}", summary.duplicates);
            println!("  Cells propagated:   {}", summary.propagated_cells);
            println!("  Logs saved to {}", config.log_dir.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", "Audit failed.".red());
            Err(e)
        }
    }
}

/// Take a path from the flag, or prompt for it. The file must exist.
fn resolve_path(arg: Option<PathBuf>, prompt: &str) -> Result<PathBuf> {
    let path = match arg {
        Some(p) => p,
        None => {
            let entered: String = Input::new()
                .with_prompt(prompt)
                .interact_text()
                .context("Failed to read file path from prompt")?;
            PathBuf::from(entered.trim())
        }
    };
    if !path.exists() {
        bail!("File does not exist: {}", path.display());
    }
    Ok(path)
}
