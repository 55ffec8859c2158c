//! Meter-reading reconciliation
//!
//! This module provides the audit over two periodic snapshots of equipment
//! meter readings: carry-forward of closing meters, duplicate quarantine,
//! set-based serial matching, and the audit artifacts each step leaves
//! behind. All of it is pure logic over in-memory tables; presentation
//! consumes the event stream.

pub mod artifacts;
pub mod carry_forward;
pub mod dedupe;
pub mod events;
pub mod matching;
pub mod normalize;
pub mod pipeline;

pub use events::{AuditEvent, EventSink};
pub use pipeline::{AuditSummary, run_audit};
