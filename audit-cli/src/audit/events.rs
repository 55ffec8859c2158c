//! Events emitted by a running audit
//!
//! The pipeline never touches the terminal. It pushes events through an
//! unbounded channel; whoever started the run drains them and renders
//! however it likes. This keeps the reconciliation logic free of any
//! particular display technology.

use chrono::Local;
use std::sync::mpsc::Sender;

/// One event from the worker to the presentation side.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// Timestamped human-readable console line
    Log(String),
    /// Overall progress, integer percent 0-100
    Progress(u8),
    /// The two tables carry different numbers of data rows; carry-forward is
    /// positional, so misaligned rows seed the wrong meters.
    RowCountMismatch {
        previous_rows: usize,
        current_rows: usize,
    },
}

/// Sending half handed to the pipeline.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<AuditEvent>,
}

impl EventSink {
    pub fn new(tx: Sender<AuditEvent>) -> Self {
        Self { tx }
    }

    /// Emit a console line, prefixed with the wall-clock timestamp. Also
    /// mirrored to the `log` facade for anyone running with RUST_LOG.
    pub fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::info!("{}", message);
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        // Receiver gone means the presentation side hung up; nothing to do.
        let _ = self
            .tx
            .send(AuditEvent::Log(format!("[{}] {}", timestamp, message)));
    }

    /// Report `completed` of `total` steps done.
    pub fn progress(&self, completed: usize, total: usize) {
        let percent = ((completed as f64 / total as f64) * 100.0) as u8;
        let _ = self.tx.send(AuditEvent::Progress(percent.min(100)));
    }

    pub fn send(&self, event: AuditEvent) {
        let _ = self.tx.send(event);
    }
}
