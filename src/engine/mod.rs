//! Task orchestration: the asynchronous lifecycle driving each evaluation.
//!
//! One tokio worker per accepted opportunity walks the pipeline — document
//! extraction (cached), AI analysis (optional), the three evaluators, the
//! blender, report rendering — reporting progress milestones into the shared
//! task table as it goes, then records spend with the cost governor and
//! persists the consolidated report.

pub mod error;
pub mod orchestrator;
pub mod task;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::EngineError;
pub use orchestrator::{Collaborators, EvaluationEngine};
pub use task::{TaskStatus, TaskTable, TaskView};
pub use types::{EvaluationRequest, EvaluationReport, StartOutcome};
