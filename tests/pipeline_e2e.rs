//! End-to-end pipeline tests against the public crate surface.
//!
//! Everything here runs through `EvaluationEngine` with mock collaborators:
//! no network, no real documents, tempdir-backed cache and ledger.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bidscope::cache::CacheCategory;
use bidscope::clients::mock::{MockAiClient, MockIngestor, MockRenderer, MockSearchClient};
use bidscope::config::Config;
use bidscope::engine::{Collaborators, EvaluationEngine, StartOutcome, TaskStatus};
use bidscope::profile::CompanyProfile;
use tempfile::TempDir;

const TENDER_TEXT: &str = "Development of an HR management system. Duration: 12 months. \
     Budget: 5,000,000 SAR. Requires ISO 9001 certification and Java experience.";

fn test_config(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().join("data"),
        cache_dir: dir.path().join("data/cache"),
        batch_stagger: Duration::ZERO,
        call_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

fn test_engine(dir: &TempDir) -> EvaluationEngine {
    EvaluationEngine::new(
        test_config(dir),
        CompanyProfile::default(),
        Collaborators {
            ingestor: Arc::new(MockIngestor),
            ai: Some(Arc::new(MockAiClient::structured())),
            search: Some(Arc::new(MockSearchClient::new())),
            renderer: Some(Arc::new(MockRenderer::new(dir.path().join("reports")))),
        },
    )
}

fn write_tender(dir: &TempDir) -> PathBuf {
    let folder = dir.path().join("docs");
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("tender.txt"), TENDER_TEXT).unwrap();
    folder
}

async fn wait_until_done(engine: &EvaluationEngine, id: &str) -> TaskStatus {
    for _ in 0..500 {
        if let Some(view) = engine.status(id) {
            match view.status {
                TaskStatus::Completed | TaskStatus::Error => return view.status,
                _ => {}
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("evaluation did not finish in time");
}

#[tokio::test]
async fn test_full_pipeline_produces_report_and_artifacts() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    let folder = write_tender(&dir);

    assert_eq!(
        engine.start_evaluation("opp-e2e", "HR system tender", folder),
        StartOutcome::Accepted
    );
    assert_eq!(wait_until_done(&engine, "opp-e2e").await, TaskStatus::Completed);

    let report = engine.result("opp-e2e").expect("report available");
    assert_eq!(report.opportunity_id, "opp-e2e");
    assert_eq!(report.document_files, vec!["tender.txt".to_string()]);
    assert!(report.ai_summary.is_some());
    assert!(report.financial.pricing.target_price > 0.0);
    assert!(report.cost.analysis_cost > 0.0);

    // The consolidated report lands in the analysis cache, keyed by id.
    assert!(engine
        .cache()
        .get(CacheCategory::Analysis, "opp-e2e")
        .is_some());

    // And the renderer wrote a file.
    assert!(dir.path().join("reports/opp-e2e.report.json").exists());
}

#[tokio::test]
async fn test_pipeline_degrades_when_everything_external_fails() {
    let dir = TempDir::new().unwrap();
    let engine = EvaluationEngine::new(
        test_config(&dir),
        CompanyProfile::default(),
        Collaborators {
            ingestor: Arc::new(MockIngestor),
            ai: Some(Arc::new(MockAiClient::failing())),
            search: Some(Arc::new(MockSearchClient::failing())),
            renderer: None,
        },
    );
    let folder = write_tender(&dir);

    engine.start_evaluation("opp-degraded", "HR system tender", folder);
    assert_eq!(
        wait_until_done(&engine, "opp-degraded").await,
        TaskStatus::Completed
    );

    let report = engine.result("opp-degraded").unwrap();
    assert!(report.ai_summary.is_none());
    assert!(report.recommendation.rule_based);
    assert!(report.market.fully_placeholder);
    assert_eq!(report.cost.analysis_cost, 0.0);
}

#[tokio::test]
async fn test_report_json_round_trips() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    let folder = write_tender(&dir);

    engine.start_evaluation("opp-json", "HR system tender", folder);
    wait_until_done(&engine, "opp-json").await;

    let report = engine.result("opp-json").unwrap();
    let serialized = serde_json::to_string(report.as_ref()).unwrap();
    let restored: bidscope::engine::EvaluationReport =
        serde_json::from_str(&serialized).unwrap();

    assert_eq!(restored.opportunity_id, report.opportunity_id);
    assert_eq!(
        restored.recommendation.should_bid,
        report.recommendation.should_bid
    );
    assert_eq!(restored.cost.analysis_cost, report.cost.analysis_cost);
}

#[tokio::test]
async fn test_second_engine_reuses_cached_documents_and_searches() {
    let dir = TempDir::new().unwrap();
    let folder = write_tender(&dir);

    let first = test_engine(&dir);
    first.start_evaluation("opp-warm", "HR system tender", folder.clone());
    wait_until_done(&first, "opp-warm").await;
    let cold_cost = first.result("opp-warm").unwrap().cost.analysis_cost;
    assert!(cold_cost > 0.0);
    drop(first);

    // A fresh engine over the same directories sees the persisted cache, so
    // the rerun pays for the AI call but none of the searches.
    let second = test_engine(&dir);
    second.start_evaluation("opp-warm", "HR system tender", folder);
    wait_until_done(&second, "opp-warm").await;

    let report = second.result("opp-warm").unwrap();
    assert!(report.cost.analysis_cost < cold_cost);
    assert_eq!(report.market.live_search_count(), 0);
}

#[tokio::test]
async fn test_cost_ledger_survives_engine_restarts() {
    let dir = TempDir::new().unwrap();
    let folder = write_tender(&dir);

    let first = test_engine(&dir);
    first.start_evaluation("opp-a", "HR system tender", folder.clone());
    wait_until_done(&first, "opp-a").await;
    let spend_after_one = first.governor().total_summary().total_cost;
    assert!(spend_after_one > 0.0);
    drop(first);

    let second = test_engine(&dir);
    // The new governor loads the persisted ledger before recording anything.
    assert_eq!(second.governor().total_summary().total_cost, spend_after_one);

    second.start_evaluation("opp-b", "HR system tender", folder);
    wait_until_done(&second, "opp-b").await;

    let total = second.governor().total_summary();
    assert!(total.total_cost > spend_after_one);
    assert_eq!(total.num_analyses, 2);
}
