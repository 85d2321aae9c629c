//! Market enrichment through bounded, cached external searches.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::extract::Extractor;
use super::Opportunity;
use crate::cache::{CacheCategory, ContentCache};
use crate::clients::SearchClient;
use crate::hashing::fingerprint_query;

const MAX_RESULTS_PER_QUERY: usize = 5;

/// Where a finding's results came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSource {
    /// Fresh cache hit; no paid call was made.
    Cache,
    /// Live search call.
    Live,
    /// Placeholder data; search was unavailable or failed.
    Placeholder,
}

/// One market research angle and its findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketFinding {
    /// Query issued (or that would have been issued).
    pub query: String,
    /// Provider-shaped results, or a placeholder object.
    pub results: Value,
    /// How the results were obtained.
    pub source: FindingSource,
}

/// Full market scorecard for one opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketScorecard {
    /// Similar published opportunities.
    pub similar_opportunities: MarketFinding,
    /// Salary benchmarks for the detected sector.
    pub salary_benchmarks: MarketFinding,
    /// Candidate suppliers and partners.
    pub suppliers: MarketFinding,
    /// Technology documentation and resources.
    pub technology_resources: MarketFinding,
    /// True when every finding is placeholder data.
    pub fully_placeholder: bool,
}

impl MarketScorecard {
    /// All-placeholder scorecard, used when search is unavailable or timed
    /// out; clearly flagged so downstream consumers can tell.
    pub fn placeholder(opportunity: &Opportunity) -> Self {
        let mut iter = queries_for(opportunity).into_iter().map(placeholder_finding);
        Self {
            similar_opportunities: iter.next().unwrap(),
            salary_benchmarks: iter.next().unwrap(),
            suppliers: iter.next().unwrap(),
            technology_resources: iter.next().unwrap(),
            fully_placeholder: true,
        }
    }

    fn findings(&self) -> [&MarketFinding; 4] {
        [
            &self.similar_opportunities,
            &self.salary_benchmarks,
            &self.suppliers,
            &self.technology_resources,
        ]
    }

    /// Number of paid search calls behind this scorecard.
    pub fn live_search_count(&self) -> u32 {
        self.findings()
            .iter()
            .filter(|f| f.source == FindingSource::Live)
            .count() as u32
    }
}

/// Market evaluator: four bounded searches through the `search` cache.
pub struct MarketEvaluator {
    cache: Arc<ContentCache>,
    search: Option<Arc<dyn SearchClient>>,
}

impl MarketEvaluator {
    /// Creates an evaluator; `search: None` means placeholder-only output.
    pub fn new(cache: Arc<ContentCache>, search: Option<Arc<dyn SearchClient>>) -> Self {
        Self { cache, search }
    }

    /// Researches one opportunity, never failing.
    pub async fn evaluate(&self, opportunity: &Opportunity) -> MarketScorecard {
        let queries = queries_for(opportunity);

        let findings = join_all(queries.into_iter().map(|query| self.run_query(query))).await;

        let fully_placeholder = findings
            .iter()
            .all(|f| f.source == FindingSource::Placeholder);
        let mut iter = findings.into_iter();
        let scorecard = MarketScorecard {
            similar_opportunities: iter.next().unwrap(),
            salary_benchmarks: iter.next().unwrap(),
            suppliers: iter.next().unwrap(),
            technology_resources: iter.next().unwrap(),
            fully_placeholder,
        };

        debug!(
            opportunity_id = %opportunity.id,
            placeholder = scorecard.fully_placeholder,
            "market evaluation complete"
        );
        scorecard
    }

    async fn run_query(&self, query: String) -> MarketFinding {
        let fingerprint = fingerprint_query(&query);
        if let Some(cached) = self.cache.get(CacheCategory::Search, &fingerprint) {
            return MarketFinding {
                query,
                results: cached,
                source: FindingSource::Cache,
            };
        }

        let Some(client) = &self.search else {
            return placeholder_finding(query);
        };

        match client.search(&query, MAX_RESULTS_PER_QUERY).await {
            Ok(results) => {
                self.cache
                    .set(CacheCategory::Search, &fingerprint, results.clone());
                MarketFinding {
                    query,
                    results,
                    source: FindingSource::Live,
                }
            }
            Err(e) => {
                warn!(query, error = %e, "search failed, using placeholder data");
                placeholder_finding(query)
            }
        }
    }
}

fn queries_for(opportunity: &Opportunity) -> Vec<String> {
    let sector = format!("{:?}", Extractor.project_type(&opportunity.text)).to_lowercase();
    let subject = if opportunity.title.is_empty() {
        sector.clone()
    } else {
        opportunity.title.clone()
    };
    vec![
        format!("similar government tenders {subject} Saudi Arabia"),
        format!("average salaries {sector} sector Saudi Arabia"),
        format!("suppliers and partners {subject} Saudi Arabia"),
        format!("technology requirements documentation {subject}"),
    ]
}

fn placeholder_finding(query: String) -> MarketFinding {
    let results = if query.contains("salaries") {
        json!({
            "note": "placeholder data; search service unavailable",
            "monthly_salaries_sar": {
                "project_manager": 20_000,
                "senior_developer": 18_000,
                "developer": 12_000,
                "engineer": 15_000,
                "analyst": 13_000,
                "consultant": 25_000,
            },
        })
    } else {
        json!({
            "note": "placeholder data; search service unavailable",
            "results": [],
        })
    };
    MarketFinding {
        query,
        results,
        source: FindingSource::Placeholder,
    }
}
