use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use super::error::EngineError;
use super::task::{TaskTable, TaskView};
use super::types::{EvaluationReport, EvaluationRequest, StartOutcome};
use crate::cache::{CacheCategory, ContentCache};
use crate::clients::{
    parse_ai_summary, AiClient, AiSummary, DocumentIngestor, IngestedDocuments, ReportRenderer,
    SearchClient,
};
use crate::config::Config;
use crate::cost::{
    estimate_model_cost, estimate_search_cost, CostBreakdown, CostGovernor, ModelUsage,
    SearchUsage,
};
use crate::evaluators::{
    Blender, FinancialEvaluator, MarketEvaluator, Opportunity, RequirementHints,
    TechnicalEvaluator,
};
use crate::hashing::fingerprint_folder;
use crate::profile::CompanyProfile;

/// External collaborators wired into the engine.
///
/// AI, search, and rendering are optional; the engine degrades without
/// them. Document ingestion is required — there is nothing to evaluate
/// without text.
pub struct Collaborators {
    /// Document text extraction.
    pub ingestor: Arc<dyn DocumentIngestor>,
    /// Language-model analysis, optional.
    pub ai: Option<Arc<dyn AiClient>>,
    /// Web search for market enrichment, optional.
    pub search: Option<Arc<dyn SearchClient>>,
    /// Report rendering, optional and best-effort.
    pub renderer: Option<Arc<dyn ReportRenderer>>,
}

struct EngineInner {
    config: Config,
    cache: Arc<ContentCache>,
    governor: Arc<CostGovernor>,
    tasks: TaskTable,
    ingestor: Arc<dyn DocumentIngestor>,
    ai: Option<Arc<dyn AiClient>>,
    renderer: Option<Arc<dyn ReportRenderer>>,
    profile: Arc<CompanyProfile>,
    financial: FinancialEvaluator,
    technical: TechnicalEvaluator,
    market: MarketEvaluator,
    blender: Blender,
}

/// The evaluation orchestrator.
///
/// Owns the task table and spawns one tokio worker per evaluation. Cheap to
/// clone; all clones share the same state.
#[derive(Clone)]
pub struct EvaluationEngine {
    inner: Arc<EngineInner>,
}

impl EvaluationEngine {
    /// Builds an engine from configuration and collaborators.
    pub fn new(config: Config, profile: CompanyProfile, collaborators: Collaborators) -> Self {
        let cache = Arc::new(ContentCache::new(config.cache_dir.clone()));
        let governor = Arc::new(CostGovernor::new(
            &config.data_dir,
            config.monthly_budget_limit,
        ));
        let profile = Arc::new(profile);

        let financial = FinancialEvaluator::new(profile.pricing_strategy.clone());
        let technical = TechnicalEvaluator::new(profile.clone());
        let market = MarketEvaluator::new(cache.clone(), collaborators.search);

        Self {
            inner: Arc::new(EngineInner {
                config,
                cache,
                governor,
                tasks: TaskTable::new(),
                ingestor: collaborators.ingestor,
                ai: collaborators.ai,
                renderer: collaborators.renderer,
                profile,
                financial,
                technical,
                market,
                blender: Blender,
            }),
        }
    }

    /// The shared content cache.
    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.inner.cache
    }

    /// The shared cost governor.
    pub fn governor(&self) -> &Arc<CostGovernor> {
        &self.inner.governor
    }

    /// Starts an evaluation, spawning a worker on success.
    ///
    /// Returns [`StartOutcome::Conflict`] when an evaluation for the same
    /// opportunity is still queued or processing.
    pub fn start_evaluation(
        &self,
        opportunity_id: &str,
        title: &str,
        folder: PathBuf,
    ) -> StartOutcome {
        if !self.inner.tasks.try_admit(opportunity_id) {
            return StartOutcome::Conflict;
        }

        info!(opportunity_id, folder = %folder.display(), "evaluation accepted");
        let engine = self.clone();
        let opportunity_id = opportunity_id.to_string();
        let title = title.to_string();
        tokio::spawn(async move {
            engine.run_worker(opportunity_id, title, folder).await;
        });
        StartOutcome::Accepted
    }

    /// Starts many evaluations, staggering worker starts by the configured
    /// delay so external services are not hit all at once.
    pub async fn evaluate_batch(
        &self,
        requests: Vec<EvaluationRequest>,
    ) -> Vec<(String, StartOutcome)> {
        let stagger = self.inner.config.batch_stagger;
        let mut outcomes = Vec::with_capacity(requests.len());
        let last = requests.len().saturating_sub(1);

        for (i, request) in requests.into_iter().enumerate() {
            let outcome =
                self.start_evaluation(&request.opportunity_id, &request.title, request.folder);
            outcomes.push((request.opportunity_id, outcome));
            if i < last && !stagger.is_zero() {
                tokio::time::sleep(stagger).await;
            }
        }
        outcomes
    }

    /// Status snapshot for one opportunity's task.
    pub fn status(&self, opportunity_id: &str) -> Option<TaskView> {
        self.inner.tasks.view(opportunity_id)
    }

    /// A completed evaluation's report, if ready.
    pub fn result(&self, opportunity_id: &str) -> Option<Arc<EvaluationReport>> {
        self.inner.tasks.result(opportunity_id)
    }

    /// Removes an opportunity's task record.
    pub fn purge(&self, opportunity_id: &str) -> bool {
        self.inner.tasks.purge(opportunity_id)
    }

    async fn run_worker(&self, opportunity_id: String, title: String, folder: PathBuf) {
        match self.evaluate(&opportunity_id, &title, &folder).await {
            Ok(report) => {
                info!(
                    opportunity_id,
                    should_bid = report.recommendation.should_bid,
                    "evaluation completed"
                );
                self.inner.tasks.complete(&opportunity_id, Arc::new(report));
            }
            Err(e) => {
                warn!(opportunity_id, error = %e, "evaluation failed");
                self.inner.tasks.fail(&opportunity_id, e.to_string());
            }
        }
    }

    #[instrument(skip(self, title, folder))]
    async fn evaluate(
        &self,
        opportunity_id: &str,
        title: &str,
        folder: &Path,
    ) -> Result<EvaluationReport, EngineError> {
        let inner = &self.inner;
        let tasks = &inner.tasks;

        tasks.advance(opportunity_id, 10, "extracting documents");
        let documents = self.load_documents(folder).await?;
        let opportunity = Opportunity {
            id: opportunity_id.to_string(),
            title: title.to_string(),
            text: documents.combined_text.clone(),
        };

        tasks.advance(opportunity_id, 30, "AI analysis");
        let over_budget_stop =
            inner.config.hard_budget_stop && inner.governor.is_over_budget();
        let (ai_summary, model_usage) = if over_budget_stop {
            warn!(opportunity_id, "month over budget, skipping paid AI call");
            (None, ModelUsage::default())
        } else {
            self.run_ai_analysis(&opportunity).await
        };
        let hints = requirement_hints(ai_summary.as_ref());

        tasks.advance(opportunity_id, 45, "financial evaluation");
        let financial = inner.financial.evaluate(&opportunity, hints.as_ref());

        tasks.advance(opportunity_id, 60, "technical evaluation");
        let technical = inner.technical.evaluate(&opportunity, hints.as_ref());

        tasks.advance(opportunity_id, 70, "market research");
        let market = match timeout(
            inner.config.call_timeout,
            inner.market.evaluate(&opportunity),
        )
        .await
        {
            Ok(scorecard) => scorecard,
            Err(_) => {
                warn!(opportunity_id, "market research timed out, using placeholder data");
                crate::evaluators::MarketScorecard::placeholder(&opportunity)
            }
        };

        tasks.advance(opportunity_id, 85, "blending recommendation");
        let recommendation = inner
            .blender
            .blend(&financial, &technical, ai_summary.as_ref());

        let search_usage = SearchUsage {
            num_searches: market.live_search_count(),
            cost: estimate_search_cost(market.live_search_count()),
        };
        let cost = inner.governor.record(
            opportunity_id,
            CostBreakdown::new(model_usage, search_usage),
        );
        if let Some(warning) = &cost.warning {
            warn!(opportunity_id, level = ?warning.level, "{}", warning.message);
        }

        let report = EvaluationReport {
            opportunity_id: opportunity_id.to_string(),
            generated_at: Utc::now(),
            document_files: documents.files,
            ai_summary,
            ai_skipped_over_budget: over_budget_stop,
            financial,
            technical,
            market,
            recommendation,
            cost,
        };

        tasks.advance(opportunity_id, 95, "rendering report");
        self.render_report(&report).await;
        self.persist_report(&report);

        Ok(report)
    }

    /// Returns document text, through the `documents` cache category.
    ///
    /// An unreadable folder or failed ingestion is fatal to the task.
    async fn load_documents(&self, folder: &Path) -> Result<IngestedDocuments, EngineError> {
        let inner = &self.inner;
        let fingerprint =
            fingerprint_folder(folder).map_err(|source| EngineError::DocumentFolder {
                path: folder.to_path_buf(),
                source,
            })?;

        if let Some(cached) = inner.cache.get(CacheCategory::Documents, &fingerprint) {
            if let Ok(documents) = serde_json::from_value::<IngestedDocuments>(cached) {
                return Ok(documents);
            }
        }

        let documents = timeout(inner.config.call_timeout, inner.ingestor.ingest(folder))
            .await
            .map_err(|_| EngineError::Timeout {
                step: "document ingestion",
            })??;

        if let Ok(payload) = serde_json::to_value(&documents) {
            inner
                .cache
                .set(CacheCategory::Documents, &fingerprint, payload);
        }
        Ok(documents)
    }

    /// Runs the paid AI call; any failure degrades to no hints.
    async fn run_ai_analysis(&self, opportunity: &Opportunity) -> (Option<AiSummary>, ModelUsage) {
        let inner = &self.inner;
        let Some(ai) = &inner.ai else {
            return (None, ModelUsage::default());
        };

        let prompt = build_prompt(opportunity, &inner.profile);
        match timeout(inner.config.call_timeout, ai.analyze(&prompt)).await {
            Ok(Ok(response)) => {
                let usage = ModelUsage {
                    input_tokens: response.input_tokens,
                    output_tokens: response.output_tokens,
                    cost: estimate_model_cost(
                        ai.tier(),
                        response.input_tokens,
                        response.output_tokens,
                    ),
                };
                (Some(parse_ai_summary(&response.text)), usage)
            }
            Ok(Err(e)) => {
                warn!(opportunity_id = %opportunity.id, error = %e, "AI analysis failed, proceeding without hints");
                (None, ModelUsage::default())
            }
            Err(_) => {
                warn!(opportunity_id = %opportunity.id, "AI analysis timed out, proceeding without hints");
                (None, ModelUsage::default())
            }
        }
    }

    /// Best-effort report rendering; failure never fails the task.
    async fn render_report(&self, report: &EvaluationReport) {
        let inner = &self.inner;
        let Some(renderer) = &inner.renderer else {
            return;
        };
        let Ok(payload) = serde_json::to_value(report) else {
            return;
        };

        match timeout(
            inner.config.call_timeout,
            renderer.render(&report.opportunity_id, &payload),
        )
        .await
        {
            Ok(Ok(path)) => {
                info!(opportunity_id = %report.opportunity_id, path = %path.display(), "report rendered");
            }
            Ok(Err(e)) => {
                warn!(opportunity_id = %report.opportunity_id, error = %e, "report rendering failed");
            }
            Err(_) => {
                warn!(opportunity_id = %report.opportunity_id, "report rendering timed out");
            }
        }
    }

    /// Writes the completed report into the `analysis` cache category,
    /// keyed by opportunity id.
    fn persist_report(&self, report: &EvaluationReport) {
        if let Ok(payload) = serde_json::to_value(report) {
            self.inner
                .cache
                .set(CacheCategory::Analysis, &report.opportunity_id, payload);
        }
    }
}

fn requirement_hints(summary: Option<&AiSummary>) -> Option<RequirementHints> {
    summary
        .and_then(|s| s.verdict().requirements.as_ref())
        .and_then(RequirementHints::from_value)
}

fn build_prompt(opportunity: &Opportunity, profile: &CompanyProfile) -> String {
    let context = profile.ai_context_summary();
    let request = json!({
        "recommendation": "PROCEED | CONSIDER | SKIP",
        "confidence": "High | Medium | Low",
        "priority": "High | Medium | Low",
        "executive_summary": "string",
        "key_strengths": ["string"],
        "key_concerns": ["string"],
        "requirements": {
            "certifications": ["string"],
            "classification_codes": ["string"],
            "experience_years": 0,
            "technologies": ["string"],
            "team_size": 0,
            "budget": 0,
            "duration_months": 0,
        },
    });

    format!(
        "You are evaluating a procurement opportunity for the company below.\n\n\
         {context}\n\n\
         Opportunity: {title}\n\
         Documents:\n{text}\n\n\
         Respond with JSON only, in exactly this shape:\n{request}",
        title = opportunity.title,
        text = opportunity.text,
        request = request,
    )
}
