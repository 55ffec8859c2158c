//! Audit pipeline orchestration
//!
//! Drives the reconciliation stages in a fixed order against one pair of
//! workbooks. There is no branching, no retry, and no rollback: a failure
//! aborts the run where it stands, the current file is only written at the
//! very end, and artifacts already on disk stay there.

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::sheet;

use super::artifacts;
use super::carry_forward::propagate_start_meters;
use super::dedupe::quarantine_duplicates;
use super::events::{AuditEvent, EventSink};
use super::matching::{match_serials, previous_key_set};

/// Progress is reported in five steps: carry-forward, matching, cleanup,
/// export, completion.
const TOTAL_STEPS: usize = 5;

/// Stages of one run, entered strictly in order. `Failed` is reachable from
/// any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Validating,
    DeduplicatingCurrent,
    PropagatingMeters,
    MatchingSerials,
    CleaningUp,
    ExportingArtifacts,
    Saving,
    Done,
    Failed,
}

fn enter(stage: &mut Stage, next: Stage) {
    log::debug!("stage {:?} -> {:?}", stage, next);
    *stage = next;
}

/// What one completed run did, for the closing report.
#[derive(Debug)]
pub struct AuditSummary {
    pub matched: usize,
    pub unmatched: usize,
    pub duplicates: usize,
    pub propagated_cells: usize,
    /// Artifact files written, in write order
    pub artifacts: Vec<PathBuf>,
}

/// Run one audit. Failures are logged once here, with the event stream
/// carrying the single human-readable reason, then propagated to the caller.
pub fn run_audit(
    previous: &Path,
    current: &Path,
    config: &AuditConfig,
    sink: &EventSink,
) -> Result<AuditSummary> {
    let mut stage = Stage::Init;
    let result = execute(previous, current, config, sink, &mut stage);
    if let Err(e) = &result {
        enter(&mut stage, Stage::Failed);
        sink.log(format!("Audit failed: {:#}", e));
    }
    result
}

fn execute(
    previous: &Path,
    current: &Path,
    config: &AuditConfig,
    sink: &EventSink,
    stage: &mut Stage,
) -> Result<AuditSummary> {
    let _guard = RunGuard::acquire(previous, current)?;

    fs::create_dir_all(&config.log_dir).map_err(AuditError::Io)?;
    let slug = artifacts::timestamp_slug();
    let headers = &config.headers;
    let mut summary = AuditSummary {
        matched: 0,
        unmatched: 0,
        duplicates: 0,
        propagated_cells: 0,
        artifacts: Vec::new(),
    };

    sink.log("Starting audit...");

    // Validating: the only up-front check is that both tables expose the
    // serial column by its exact (trimmed) name. Any other missing header
    // surfaces later as a lookup failure.
    enter(stage, Stage::Validating);
    let prev_table = sheet::load_first_sheet(previous)?;
    let mut workbook = sheet::load_workbook(current)?;
    let data_idx = workbook
        .iter()
        .position(|t| t.sheet_name == config.current_sheet)
        .with_context(|| {
            format!(
                "Worksheet '{}' not found in {}",
                config.current_sheet,
                current.display()
            )
        })?;

    if !prev_table.has_header_exact(&headers.serial) {
        bail!(AuditError::Validation {
            column: headers.serial.clone(),
            file: previous.to_path_buf(),
        });
    }
    if !workbook[data_idx].has_header_exact(&headers.serial) {
        bail!(AuditError::Validation {
            column: headers.serial.clone(),
            file: current.to_path_buf(),
        });
    }

    // DeduplicatingCurrent: quarantine before any other mutation so
    // duplicate rows can never match.
    enter(stage, Stage::DeduplicatingCurrent);
    sink.log("Checking for duplicates...");
    let original_headers = workbook[data_idx].headers();
    let duplicates = quarantine_duplicates(&mut workbook[data_idx], &headers.serial)?;
    summary.duplicates = duplicates.len();
    if !duplicates.is_empty() {
        let path = artifacts::write_duplicates(&config.log_dir, &slug, &original_headers, &duplicates)?;
        sink.log(format!("Duplicates saved to {}", path.display()));
        summary.artifacts.push(path);
    }
    sink.log(format!("Blanked {} duplicate entries.", duplicates.len()));

    // PropagatingMeters
    enter(stage, Stage::PropagatingMeters);
    sink.log("Syncing B/W Start Meter...");
    let carry = propagate_start_meters(
        &prev_table,
        &mut workbook[data_idx],
        &headers.end_meter,
        &headers.start_meter,
    )?;
    summary.propagated_cells = carry.records.len();
    if let Some((previous_rows, current_rows)) = carry.row_count_mismatch {
        sink.log(format!(
            "Warning: row counts differ (previous: {}, current: {}); carry-forward is positional",
            previous_rows, current_rows
        ));
        sink.send(AuditEvent::RowCountMismatch {
            previous_rows,
            current_rows,
        });
    }
    let path = artifacts::write_meter_log(&config.log_dir, &slug, &carry.records)?;
    sink.log(format!("B/W Start Meter log saved to {}", path.display()));
    summary.artifacts.push(path);
    sink.log("Synced B/W Start Meter.");
    sink.progress(1, TOTAL_STEPS);

    // MatchingSerials
    enter(stage, Stage::MatchingSerials);
    sink.log("Matching Serial Numbers...");
    let keys = previous_key_set(&prev_table, &headers.serial)?;
    let outcome = match_serials(
        &mut workbook[data_idx],
        &keys,
        &headers.serial,
        &headers.helper,
    )?;
    sink.log(format!(
        "Matching complete. Matched: {}, Unmatched: {}",
        outcome.matched.len(),
        outcome.unmatched.len()
    ));
    summary.matched = outcome.matched.len();
    summary.unmatched = outcome.unmatched.len();
    sink.progress(2, TOTAL_STEPS);

    // CleaningUp: the helper column is scaffolding and must not reach the
    // saved file. Its absence is not an error.
    enter(stage, Stage::CleaningUp);
    sink.log(format!("Deleting column '{}'...", headers.helper));
    if workbook[data_idx].remove_column(&headers.helper) {
        sink.log(format!("Deleted column '{}'.", headers.helper));
    } else {
        sink.log(format!("Column '{}' not found.", headers.helper));
    }
    sink.progress(3, TOTAL_STEPS);

    // ExportingArtifacts
    enter(stage, Stage::ExportingArtifacts);
    let path = artifacts::write_serials_csv(
        &config.log_dir,
        &slug,
        "matched_serials",
        "Matched Serials",
        &outcome.matched,
    )?;
    summary.artifacts.push(path);
    let path = artifacts::write_serials_csv(
        &config.log_dir,
        &slug,
        "unmatched_serials",
        "Unmatched Serials",
        &outcome.unmatched,
    )?;
    summary.artifacts.push(path);
    sink.log("Matched & unmatched serials exported.");
    sink.progress(4, TOTAL_STEPS);

    // Saving: the one and only write to the current file.
    enter(stage, Stage::Saving);
    sheet::write_workbook(&workbook, current)?;

    enter(stage, Stage::Done);
    sink.log("Audit completed successfully.");
    sink.progress(TOTAL_STEPS, TOTAL_STEPS);

    Ok(summary)
}

/// Process-global single-flight registry keyed on the canonicalized file
/// pair. A second run against the same pair fails fast instead of racing the
/// first over the current file.
static ACTIVE_RUNS: Lazy<Mutex<HashSet<(PathBuf, PathBuf)>>> =
    Lazy::new(|| Mutex::new(HashSet::new()));

struct RunGuard {
    key: (PathBuf, PathBuf),
}

impl RunGuard {
    fn acquire(previous: &Path, current: &Path) -> Result<Self, AuditError> {
        let key = (canonical(previous), canonical(current));
        let mut active = ACTIVE_RUNS.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(key.clone()) {
            return Err(AuditError::RunInProgress);
        }
        Ok(Self { key })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        ACTIVE_RUNS
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{CellValue, Table, load_workbook, write_workbook};
    use std::sync::mpsc;

    fn previous_table() -> Table {
        Table::from_headers(
            "Sheet1",
            &["Serial Number", "End Meter"],
            vec![
                vec![CellValue::from("A1"), CellValue::Int(100)],
                vec![CellValue::from("B2"), CellValue::Int(200)],
            ],
        )
    }

    fn current_tables(serials: &[&str]) -> Vec<Table> {
        let data = Table::from_headers(
            "DATA",
            &["Serial Number", "B/W Start Meter"],
            serials
                .iter()
                .map(|s| vec![CellValue::from(*s), CellValue::Null])
                .collect(),
        );
        let notes = Table::from_headers("Notes", &["Remark"], vec![vec![CellValue::from("keep")]]);
        vec![data, notes]
    }

    fn sink() -> (EventSink, mpsc::Receiver<AuditEvent>) {
        let (tx, rx) = mpsc::channel();
        (EventSink::new(tx), rx)
    }

    fn drain_logs(rx: &mpsc::Receiver<AuditEvent>) -> Vec<String> {
        rx.try_iter()
            .filter_map(|e| match e {
                AuditEvent::Log(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_full_run_reconciles_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let prev_path = dir.path().join("previous.xlsx");
        let curr_path = dir.path().join("current.xlsx");
        write_workbook(&[previous_table()], &prev_path).unwrap();
        write_workbook(&current_tables(&["A1 ", "Z8"]), &curr_path).unwrap();

        let config = AuditConfig {
            log_dir: dir.path().join("logs"),
            ..AuditConfig::default()
        };
        let (sink, rx) = sink();
        let summary = run_audit(&prev_path, &curr_path, &config, &sink).unwrap();

        assert_eq!(summary.matched, 1);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.duplicates, 0);
        assert_eq!(summary.propagated_cells, 2);
        // meter log + matched csv + unmatched csv
        assert_eq!(summary.artifacts.len(), 3);
        assert!(summary.artifacts.iter().all(|p| p.exists()));

        let saved = load_workbook(&curr_path).unwrap();
        assert_eq!(saved.len(), 2);
        let data = &saved[0];
        // Carry-forward landed positionally
        assert_eq!(data.cell(2, 2).to_string(), "100");
        assert_eq!(data.cell(3, 2).to_string(), "200");
        // Matched serial kept as stored, unmatched blanked
        assert_eq!(data.cell(2, 1).to_string(), "A1 ");
        assert!(data.cell(3, 1).is_empty());
        // Helper column never reaches the saved file
        assert!(data.find_column("Nashua Serial Number").is_err());
        // Other sheets survive the round trip
        assert_eq!(saved[1].sheet_name, "Notes");

        let logs = drain_logs(&rx);
        assert!(logs.iter().any(|l| l.contains("Matched: 1, Unmatched: 1")));
        assert!(logs.iter().any(|l| l.contains("Audit completed successfully.")));
    }

    #[test]
    fn test_duplicates_are_quarantined_and_exported() {
        let dir = tempfile::tempdir().unwrap();
        let prev_path = dir.path().join("previous.xlsx");
        let curr_path = dir.path().join("current.xlsx");
        write_workbook(&[previous_table()], &prev_path).unwrap();
        write_workbook(&current_tables(&["X9", "X9"]), &curr_path).unwrap();

        let config = AuditConfig {
            log_dir: dir.path().join("logs"),
            ..AuditConfig::default()
        };
        let (sink, _rx) = sink();
        let summary = run_audit(&prev_path, &curr_path, &config, &sink).unwrap();

        assert_eq!(summary.duplicates, 1);
        let dup_artifact = summary
            .artifacts
            .iter()
            .find(|p| p.file_name().is_some_and(|n| n.to_string_lossy().starts_with("duplicates_")))
            .expect("duplicates artifact written");
        let dup_table = crate::sheet::load_first_sheet(dup_artifact).unwrap();
        assert_eq!(dup_table.cell(2, 1).to_string(), "X9");

        // First occurrence stayed, second was blanked and then skipped by
        // matching (X9 is unknown to the previous table, so row 2 blanks too)
        let saved = load_workbook(&curr_path).unwrap();
        assert!(saved[0].cell(3, 1).is_empty());
        assert_eq!(summary.matched, 0);
        assert_eq!(summary.unmatched, 1);
    }

    #[test]
    fn test_missing_serial_column_aborts_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let prev_path = dir.path().join("previous.xlsx");
        let curr_path = dir.path().join("current.xlsx");
        let bad_previous = Table::from_headers(
            "Sheet1",
            &["Asset Tag", "End Meter"],
            vec![vec![CellValue::from("A1"), CellValue::Int(100)]],
        );
        write_workbook(&[bad_previous], &prev_path).unwrap();
        write_workbook(&current_tables(&["A1"]), &curr_path).unwrap();
        let before = fs::read(&curr_path).unwrap();

        let config = AuditConfig {
            log_dir: dir.path().join("logs"),
            ..AuditConfig::default()
        };
        let (sink, rx) = sink();
        let err = run_audit(&prev_path, &curr_path, &config, &sink).unwrap_err();

        assert!(err.to_string().contains("Serial Number"));
        assert!(err.to_string().contains("previous.xlsx"));
        // Current file untouched, no artifacts written
        assert_eq!(fs::read(&curr_path).unwrap(), before);
        assert_eq!(fs::read_dir(config.log_dir).unwrap().count(), 0);

        let logs = drain_logs(&rx);
        assert!(logs.iter().any(|l| l.contains("Audit failed:")));
    }

    #[test]
    fn test_row_count_mismatch_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let prev_path = dir.path().join("previous.xlsx");
        let curr_path = dir.path().join("current.xlsx");
        write_workbook(&[previous_table()], &prev_path).unwrap();
        write_workbook(&current_tables(&["A1", "B2", "B2 "]), &curr_path).unwrap();

        let config = AuditConfig {
            log_dir: dir.path().join("logs"),
            ..AuditConfig::default()
        };
        let (sink, rx) = sink();
        run_audit(&prev_path, &curr_path, &config, &sink).unwrap();

        let mismatch = rx.try_iter().find_map(|e| match e {
            AuditEvent::RowCountMismatch {
                previous_rows,
                current_rows,
            } => Some((previous_rows, current_rows)),
            _ => None,
        });
        assert_eq!(mismatch, Some((2, 3)));
    }

    #[test]
    fn test_second_run_against_same_pair_is_rejected() {
        let prev = Path::new("/nonexistent/audit-prev.xlsx");
        let curr = Path::new("/nonexistent/audit-curr.xlsx");
        let _guard = RunGuard::acquire(prev, curr).unwrap();
        assert!(matches!(
            RunGuard::acquire(prev, curr),
            Err(AuditError::RunInProgress)
        ));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let prev = Path::new("/nonexistent/audit-prev2.xlsx");
        let curr = Path::new("/nonexistent/audit-curr2.xlsx");
        drop(RunGuard::acquire(prev, curr).unwrap());
        assert!(RunGuard::acquire(prev, curr).is_ok());
    }
}
