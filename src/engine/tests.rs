use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use super::task::{TaskStatus, TaskTable};
use super::types::{EvaluationRequest, EvaluationReport, StartOutcome};
use super::{Collaborators, EvaluationEngine};
use crate::cache::CacheCategory;
use crate::clients::mock::{MockAiClient, MockIngestor, MockRenderer, MockSearchClient};
use crate::clients::{AiClient, ClientError, DocumentIngestor, IngestedDocuments};
use crate::config::Config;
use crate::cost::{CostBreakdown, ModelUsage, SearchUsage};
use crate::profile::CompanyProfile;

/// Ingestor that holds its caller long enough to observe in-flight state.
struct SlowIngestor {
    delay: Duration,
}

#[async_trait]
impl DocumentIngestor for SlowIngestor {
    async fn ingest(&self, folder: &Path) -> Result<IngestedDocuments, ClientError> {
        tokio::time::sleep(self.delay).await;
        MockIngestor.ingest(folder).await
    }
}

fn test_config(root: &TempDir) -> Config {
    Config {
        data_dir: root.path().join("data"),
        cache_dir: root.path().join("cache"),
        profile_path: None,
        monthly_budget_limit: 100.0,
        hard_budget_stop: false,
        call_timeout: Duration::from_secs(5),
        batch_stagger: Duration::ZERO,
    }
}

fn full_collaborators(root: &TempDir) -> Collaborators {
    Collaborators {
        ingestor: Arc::new(MockIngestor),
        ai: Some(Arc::new(MockAiClient::structured())),
        search: Some(Arc::new(MockSearchClient::new())),
        renderer: Some(Arc::new(MockRenderer::new(root.path().join("reports")))),
    }
}

fn write_documents(root: &TempDir) -> PathBuf {
    let folder = root.path().join("docs");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(
        folder.join("tender.txt"),
        "HR system development project. 12 months. 5,000,000 SAR. Requires ISO 9001.",
    )
    .unwrap();
    folder
}

async fn wait_until_done(engine: &EvaluationEngine, id: &str) -> TaskStatus {
    for _ in 0..500 {
        if let Some(view) = engine.status(id) {
            if matches!(view.status, TaskStatus::Completed | TaskStatus::Error) {
                return view.status;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("evaluation for {id} did not finish");
}

// --- task table ---

#[test]
fn test_table_admit_and_conflict() {
    let table = TaskTable::new();
    assert!(table.try_admit("opp-1"));
    assert!(!table.try_admit("opp-1"));

    table.advance("opp-1", 30, "AI analysis");
    assert!(!table.try_admit("opp-1"));
}

#[test]
fn test_table_finished_record_is_replaced() {
    let table = TaskTable::new();
    assert!(table.try_admit("opp-1"));
    table.fail("opp-1", "boom".to_string());
    assert!(table.try_admit("opp-1"));

    let view = table.view("opp-1").unwrap();
    assert_eq!(view.status, TaskStatus::Queued);
    assert!(view.error.is_none());
}

#[test]
fn test_table_failure_freezes_progress() {
    let table = TaskTable::new();
    table.try_admit("opp-1");
    table.advance("opp-1", 60, "technical evaluation");
    table.fail("opp-1", "collaborator exploded".to_string());

    let view = table.view("opp-1").unwrap();
    assert_eq!(view.status, TaskStatus::Error);
    assert_eq!(view.progress, 60);
    assert_eq!(view.error.as_deref(), Some("collaborator exploded"));
}

#[test]
fn test_table_purge() {
    let table = TaskTable::new();
    table.try_admit("opp-1");
    assert!(table.purge("opp-1"));
    assert!(!table.purge("opp-1"));
    assert!(table.is_empty());
}

// --- engine ---

#[tokio::test]
async fn test_full_evaluation_completes() {
    let root = TempDir::new().unwrap();
    let folder = write_documents(&root);
    let engine = EvaluationEngine::new(
        test_config(&root),
        CompanyProfile::default(),
        full_collaborators(&root),
    );

    assert_eq!(
        engine.start_evaluation("opp-1", "HR system", folder),
        StartOutcome::Accepted
    );
    assert_eq!(wait_until_done(&engine, "opp-1").await, TaskStatus::Completed);

    let report: Arc<EvaluationReport> = engine.result("opp-1").unwrap();
    assert_eq!(report.opportunity_id, "opp-1");
    assert!(report.ai_summary.as_ref().unwrap().is_structured());
    // Mock AI says PROCEED, so the blend follows it.
    assert!(report.recommendation.should_bid);
    assert!(!report.recommendation.rule_based);
    assert!(report.cost.analysis_cost > 0.0);
    assert_eq!(report.document_files, vec!["tender.txt"]);

    // Completed reports land in the analysis cache keyed by opportunity id.
    assert!(engine
        .cache()
        .get(CacheCategory::Analysis, "opp-1")
        .is_some());

    // Best-effort rendering wrote an artifact.
    assert!(root.path().join("reports/opp-1.report.json").exists());
}

#[tokio::test]
async fn test_duplicate_start_is_conflict() {
    let root = TempDir::new().unwrap();
    let folder = write_documents(&root);
    let engine = EvaluationEngine::new(
        test_config(&root),
        CompanyProfile::default(),
        Collaborators {
            ingestor: Arc::new(SlowIngestor {
                delay: Duration::from_millis(300),
            }),
            ai: None,
            search: None,
            renderer: None,
        },
    );

    assert_eq!(
        engine.start_evaluation("opp-1", "t", folder.clone()),
        StartOutcome::Accepted
    );
    assert_eq!(
        engine.start_evaluation("opp-1", "t", folder.clone()),
        StartOutcome::Conflict
    );

    // A different opportunity is unaffected by the in-flight one.
    assert_eq!(
        engine.start_evaluation("opp-2", "t", folder),
        StartOutcome::Accepted
    );

    assert_eq!(wait_until_done(&engine, "opp-1").await, TaskStatus::Completed);
    assert_eq!(wait_until_done(&engine, "opp-2").await, TaskStatus::Completed);
}

#[tokio::test]
async fn test_completed_opportunity_can_be_rerun() {
    let root = TempDir::new().unwrap();
    let folder = write_documents(&root);
    let engine = EvaluationEngine::new(
        test_config(&root),
        CompanyProfile::default(),
        full_collaborators(&root),
    );

    engine.start_evaluation("opp-1", "t", folder.clone());
    wait_until_done(&engine, "opp-1").await;

    assert_eq!(
        engine.start_evaluation("opp-1", "t", folder),
        StartOutcome::Accepted
    );
    assert_eq!(wait_until_done(&engine, "opp-1").await, TaskStatus::Completed);
}

#[tokio::test]
async fn test_ai_failure_degrades_to_rule_based() {
    let root = TempDir::new().unwrap();
    let folder = write_documents(&root);
    let engine = EvaluationEngine::new(
        test_config(&root),
        CompanyProfile::default(),
        Collaborators {
            ingestor: Arc::new(MockIngestor),
            ai: Some(Arc::new(MockAiClient::failing())),
            search: None,
            renderer: None,
        },
    );

    engine.start_evaluation("opp-1", "t", folder);
    assert_eq!(wait_until_done(&engine, "opp-1").await, TaskStatus::Completed);

    let report = engine.result("opp-1").unwrap();
    assert!(report.ai_summary.is_none());
    assert!(report.recommendation.rule_based);
    assert!(report.market.fully_placeholder);
    // No paid calls were made, so the recorded spend is zero.
    assert_eq!(report.cost.analysis_cost, 0.0);
}

#[tokio::test]
async fn test_missing_folder_fails_the_task() {
    let root = TempDir::new().unwrap();
    let engine = EvaluationEngine::new(
        test_config(&root),
        CompanyProfile::default(),
        full_collaborators(&root),
    );

    engine.start_evaluation("opp-1", "t", root.path().join("no-such-folder"));
    assert_eq!(wait_until_done(&engine, "opp-1").await, TaskStatus::Error);

    let view = engine.status("opp-1").unwrap();
    assert!(view.error.as_ref().unwrap().contains("document folder"));
    assert!(engine.result("opp-1").is_none());
}

#[tokio::test]
async fn test_second_run_hits_document_cache() {
    let root = TempDir::new().unwrap();
    let folder = write_documents(&root);
    let engine = EvaluationEngine::new(
        test_config(&root),
        CompanyProfile::default(),
        full_collaborators(&root),
    );

    engine.start_evaluation("opp-1", "t", folder.clone());
    wait_until_done(&engine, "opp-1").await;

    let stats = engine.cache().stats();
    assert_eq!(stats.documents, 1);

    // Rerun with an ingestor that always fails: the cached text carries it.
    let engine2 = EvaluationEngine::new(
        test_config(&root),
        CompanyProfile::default(),
        Collaborators {
            ingestor: Arc::new(FailingIngestor),
            ai: None,
            search: None,
            renderer: None,
        },
    );
    engine2.start_evaluation("opp-1", "t", folder);
    assert_eq!(wait_until_done(&engine2, "opp-1").await, TaskStatus::Completed);
}

struct FailingIngestor;

#[async_trait]
impl DocumentIngestor for FailingIngestor {
    async fn ingest(&self, _folder: &Path) -> Result<IngestedDocuments, ClientError> {
        Err(ClientError::Unavailable("always down".into()))
    }
}

#[tokio::test]
async fn test_hard_budget_stop_skips_ai_call() {
    let root = TempDir::new().unwrap();
    let folder = write_documents(&root);
    let mut config = test_config(&root);
    config.hard_budget_stop = true;
    config.monthly_budget_limit = 1.0;

    let engine = EvaluationEngine::new(
        config,
        CompanyProfile::default(),
        full_collaborators(&root),
    );

    // Push the month over its limit before evaluating.
    engine.governor().record(
        "prior",
        CostBreakdown::new(
            ModelUsage {
                input_tokens: 0,
                output_tokens: 0,
                cost: 2.0,
            },
            SearchUsage::default(),
        ),
    );

    engine.start_evaluation("opp-1", "t", folder);
    assert_eq!(wait_until_done(&engine, "opp-1").await, TaskStatus::Completed);

    let report = engine.result("opp-1").unwrap();
    assert!(report.ai_skipped_over_budget);
    assert!(report.ai_summary.is_none());
    assert!(report.recommendation.rule_based);
}

#[tokio::test]
async fn test_batch_reports_conflicts_per_request() {
    let root = TempDir::new().unwrap();
    let folder = write_documents(&root);
    let engine = EvaluationEngine::new(
        test_config(&root),
        CompanyProfile::default(),
        full_collaborators(&root),
    );

    let request = |id: &str| EvaluationRequest {
        opportunity_id: id.to_string(),
        title: "t".to_string(),
        folder: folder.clone(),
    };
    let outcomes = engine
        .evaluate_batch(vec![request("opp-1"), request("opp-2"), request("opp-1")])
        .await;

    assert_eq!(outcomes[0].1, StartOutcome::Accepted);
    assert_eq!(outcomes[1].1, StartOutcome::Accepted);
    // Duplicate within the batch conflicts unless the first already finished.
    let _ = outcomes[2].1;

    wait_until_done(&engine, "opp-1").await;
    wait_until_done(&engine, "opp-2").await;
}

#[tokio::test]
async fn test_progress_milestones_are_monotonic() {
    let root = TempDir::new().unwrap();
    let folder = write_documents(&root);
    let engine = EvaluationEngine::new(
        test_config(&root),
        CompanyProfile::default(),
        Collaborators {
            ingestor: Arc::new(SlowIngestor {
                delay: Duration::from_millis(100),
            }),
            ai: Some(Arc::new(MockAiClient::structured())),
            search: Some(Arc::new(MockSearchClient::new())),
            renderer: None,
        },
    );

    engine.start_evaluation("opp-1", "t", folder);
    let mut last = 0u8;
    loop {
        let view = engine.status("opp-1").unwrap();
        assert!(view.progress >= last, "progress went backwards");
        last = view.progress;
        if matches!(view.status, TaskStatus::Completed | TaskStatus::Error) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(last, 100);
}

#[test]
fn test_mock_ai_tier_is_standard() {
    assert_eq!(
        MockAiClient::structured().tier(),
        crate::cost::ModelTier::Standard
    );
}
