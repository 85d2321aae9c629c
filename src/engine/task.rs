//! The shared task-record table.
//!
//! Mutated by workers and read by status pollers; every access takes the
//! lock only for the duration of the read or write itself, never across an
//! await, so pollers always observe a coherent snapshot while workers block
//! on external calls.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::EvaluationReport;

/// Lifecycle state of one evaluation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepted, worker not yet running.
    Queued,
    /// Worker running.
    Processing,
    /// Finished with a result.
    Completed,
    /// Finished with an error message.
    Error,
}

/// Poller-facing view of one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    /// Opportunity under evaluation.
    pub opportunity_id: String,
    /// Lifecycle state.
    pub status: TaskStatus,
    /// Progress, 0–100.
    pub progress: u8,
    /// Human-readable current step.
    pub step: String,
    /// Error message, when status is `Error`.
    pub error: Option<String>,
    /// When the task was accepted.
    pub started_at: DateTime<Utc>,
}

#[derive(Debug)]
struct TaskRecord {
    status: TaskStatus,
    progress: u8,
    step: String,
    result: Option<Arc<EvaluationReport>>,
    error: Option<String>,
    started_at: DateTime<Utc>,
}

/// Synchronized map of task records, keyed by opportunity id.
///
/// The raw map is never exposed; all access goes through atomic operations
/// on this table. Records are retained until process exit or [`purge`].
///
/// [`purge`]: TaskTable::purge
#[derive(Debug, Default)]
pub struct TaskTable {
    records: RwLock<HashMap<String, TaskRecord>>,
}

impl TaskTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a new task for `opportunity_id`.
    ///
    /// Returns `false` (conflict) when a task for the same opportunity is
    /// still queued or processing; a finished record is replaced.
    pub fn try_admit(&self, opportunity_id: &str) -> bool {
        let mut records = self.records.write();
        if let Some(existing) = records.get(opportunity_id) {
            if matches!(existing.status, TaskStatus::Queued | TaskStatus::Processing) {
                debug!(opportunity_id, "evaluation already in flight, rejecting");
                return false;
            }
        }
        records.insert(
            opportunity_id.to_string(),
            TaskRecord {
                status: TaskStatus::Queued,
                progress: 0,
                step: "queued".to_string(),
                result: None,
                error: None,
                started_at: Utc::now(),
            },
        );
        true
    }

    /// Marks a task processing and reports its current milestone.
    pub fn advance(&self, opportunity_id: &str, progress: u8, step: &str) {
        let mut records = self.records.write();
        if let Some(record) = records.get_mut(opportunity_id) {
            record.status = TaskStatus::Processing;
            record.progress = progress;
            record.step = step.to_string();
        }
    }

    /// Completes a task with its report.
    pub fn complete(&self, opportunity_id: &str, report: Arc<EvaluationReport>) {
        let mut records = self.records.write();
        if let Some(record) = records.get_mut(opportunity_id) {
            record.status = TaskStatus::Completed;
            record.progress = 100;
            record.step = "completed".to_string();
            record.result = Some(report);
            record.error = None;
        }
    }

    /// Fails a task; progress stays at its last milestone.
    pub fn fail(&self, opportunity_id: &str, message: String) {
        let mut records = self.records.write();
        if let Some(record) = records.get_mut(opportunity_id) {
            record.status = TaskStatus::Error;
            record.error = Some(message);
        }
    }

    /// Snapshot of one task's status.
    pub fn view(&self, opportunity_id: &str) -> Option<TaskView> {
        let records = self.records.read();
        records.get(opportunity_id).map(|record| TaskView {
            opportunity_id: opportunity_id.to_string(),
            status: record.status,
            progress: record.progress,
            step: record.step.clone(),
            error: record.error.clone(),
            started_at: record.started_at,
        })
    }

    /// A completed task's report, if ready.
    pub fn result(&self, opportunity_id: &str) -> Option<Arc<EvaluationReport>> {
        let records = self.records.read();
        records.get(opportunity_id).and_then(|r| r.result.clone())
    }

    /// Removes a task record entirely.
    pub fn purge(&self, opportunity_id: &str) -> bool {
        self.records.write().remove(opportunity_id).is_some()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
