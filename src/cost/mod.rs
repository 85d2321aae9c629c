//! Cost governor: spend estimation, the append-only ledger, and budget
//! classification.
//!
//! Every completed evaluation records its model and search spend here. The
//! governor reports budget pressure (`ok` / `warning` / `critical`) but never
//! refuses a record; whether to act on a critical month is the caller's
//! decision.

pub mod error;
pub mod types;


use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

pub use error::{CostError, CostResult};
pub use types::{
    round4, BudgetLevel, BudgetWarning, CostBreakdown, CostLedger, CostRecord, ModelTier,
    ModelUsage, MonthlySummary, RecordOutcome, SearchUsage, TotalSummary, SEARCH_COST_PER_CALL,
};

const LEDGER_FILE: &str = "costs.json";

const LEDGER_TEMP_FILE: &str = "costs.json.tmp";

/// Estimates the cost of one model call from token counts.
pub fn estimate_model_cost(tier: ModelTier, input_tokens: u64, output_tokens: u64) -> f64 {
    let (input_rate, output_rate) = tier.rates();
    let input_cost = input_tokens as f64 / 1_000_000.0 * input_rate;
    let output_cost = output_tokens as f64 / 1_000_000.0 * output_rate;
    round4(input_cost + output_cost)
}

/// Estimates the cost of a batch of web searches.
pub fn estimate_search_cost(num_searches: u32) -> f64 {
    round4(num_searches as f64 * SEARCH_COST_PER_CALL)
}

struct GovernorState {
    ledger: CostLedger,
    budget_limit: f64,
}

/// Spend ledger with monthly budget classification.
///
/// The ledger is persisted as one JSON file under the data directory and
/// reloaded on startup; a missing or unreadable file starts an empty ledger.
/// The budget limit comes from configuration and may be adjusted at runtime
/// with [`CostGovernor::set_budget_limit`]; the override is not persisted.
pub struct CostGovernor {
    ledger_path: PathBuf,
    state: Mutex<GovernorState>,
}

impl CostGovernor {
    /// Opens the governor, loading any existing ledger from `data_dir`.
    pub fn new(data_dir: &Path, monthly_budget_limit: f64) -> Self {
        let ledger_path = data_dir.join(LEDGER_FILE);
        let ledger = match Self::load_ledger(&ledger_path) {
            Ok(Some(ledger)) => {
                info!(
                    path = %ledger_path.display(),
                    records = ledger.records.len(),
                    total_cost = ledger.total_cost,
                    "cost ledger loaded"
                );
                ledger
            }
            Ok(None) => CostLedger::default(),
            Err(e) => {
                warn!(path = %ledger_path.display(), error = %e, "cost ledger unreadable, starting empty");
                CostLedger::default()
            }
        };

        Self {
            ledger_path,
            state: Mutex::new(GovernorState {
                ledger,
                budget_limit: monthly_budget_limit,
            }),
        }
    }

    /// Returns the month key for a timestamp, `YYYY-MM`.
    pub fn month_key(at: DateTime<Utc>) -> String {
        at.format("%Y-%m").to_string()
    }

    /// Records the spend of one completed evaluation.
    ///
    /// Appends exactly one ledger record and adds its cost to the running
    /// totals exactly once, persists the ledger, and reports the month's
    /// budget standing.
    pub fn record(&self, opportunity_id: &str, costs: CostBreakdown) -> RecordOutcome {
        self.record_at(Utc::now(), opportunity_id, costs)
    }

    pub(crate) fn record_at(
        &self,
        at: DateTime<Utc>,
        opportunity_id: &str,
        costs: CostBreakdown,
    ) -> RecordOutcome {
        let month = Self::month_key(at);
        let mut state = self.state.lock();

        state.ledger.records.push(CostRecord {
            opportunity_id: opportunity_id.to_string(),
            timestamp: at,
            month: month.clone(),
            costs,
        });
        state.ledger.total_cost = round4(state.ledger.total_cost + costs.total);
        let monthly_total = {
            let entry = state.ledger.monthly_costs.entry(month.clone()).or_insert(0.0);
            *entry = round4(*entry + costs.total);
            *entry
        };

        if let Err(e) = self.save_ledger(&state.ledger) {
            // Durability is best-effort; the in-memory ledger stays authoritative.
            warn!(path = %self.ledger_path.display(), error = %e, "cost ledger save failed");
        }

        let budget_limit = state.budget_limit;
        drop(state);

        let percentage_used = percentage_of(monthly_total, budget_limit);
        let warning = budget_warning(percentage_used);

        debug!(
            opportunity_id,
            analysis_cost = costs.total,
            monthly_total,
            percentage_used,
            "evaluation cost recorded"
        );

        RecordOutcome {
            opportunity_id: opportunity_id.to_string(),
            analysis_cost: costs.total,
            monthly_total,
            monthly_budget: budget_limit,
            percentage_used,
            warning,
        }
    }

    /// Summarizes one month, defaulting to the current month.
    pub fn monthly_summary(&self, month: Option<&str>) -> MonthlySummary {
        let current = Self::month_key(Utc::now());
        let month = month.unwrap_or(&current);
        let state = self.state.lock();
        Self::summarize_month(&state, month)
    }

    /// Summarizes all-time spend plus the current month.
    pub fn total_summary(&self) -> TotalSummary {
        let current = Self::month_key(Utc::now());
        let state = self.state.lock();

        let num_analyses = state.ledger.records.len();
        let (model_cost, search_cost) = state
            .ledger
            .records
            .iter()
            .fold((0.0, 0.0), |(m, s), record| {
                (m + record.costs.model.cost, s + record.costs.search.cost)
            });

        TotalSummary {
            total_cost: state.ledger.total_cost,
            num_analyses,
            avg_cost_per_analysis: mean(state.ledger.total_cost, num_analyses),
            model_cost: round4(model_cost),
            search_cost: round4(search_cost),
            months_tracked: state.ledger.monthly_costs.len(),
            current_month: Self::summarize_month(&state, &current),
        }
    }

    /// Returns the most recent records, newest first.
    pub fn recent_records(&self, limit: usize) -> Vec<CostRecord> {
        let state = self.state.lock();
        state
            .ledger
            .records
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Returns the configured monthly budget limit.
    pub fn budget_limit(&self) -> f64 {
        self.state.lock().budget_limit
    }

    /// Adjusts the monthly budget limit at runtime.
    ///
    /// Non-positive amounts are rejected and the current limit stands.
    pub fn set_budget_limit(&self, amount: f64) -> bool {
        if !amount.is_finite() || amount <= 0.0 {
            warn!(amount, "rejected non-positive budget limit");
            return false;
        }
        let mut state = self.state.lock();
        info!(from = state.budget_limit, to = amount, "monthly budget limit updated");
        state.budget_limit = amount;
        true
    }

    /// Whether the current month's spend has reached the limit.
    pub fn is_over_budget(&self) -> bool {
        let current = Self::month_key(Utc::now());
        let state = self.state.lock();
        let spent = state.ledger.monthly_costs.get(&current).copied().unwrap_or(0.0);
        spent >= state.budget_limit
    }

    fn summarize_month(state: &GovernorState, month: &str) -> MonthlySummary {
        let total_cost = state.ledger.monthly_costs.get(month).copied().unwrap_or(0.0);

        let mut num_analyses = 0;
        let mut model_cost = 0.0;
        let mut search_cost = 0.0;
        for record in &state.ledger.records {
            if record.month == month {
                num_analyses += 1;
                model_cost += record.costs.model.cost;
                search_cost += record.costs.search.cost;
            }
        }

        let percentage_used = percentage_of(total_cost, state.budget_limit);

        MonthlySummary {
            month: month.to_string(),
            total_cost,
            budget_limit: state.budget_limit,
            percentage_used,
            num_analyses,
            avg_cost_per_analysis: mean(total_cost, num_analyses),
            model_cost: round4(model_cost),
            search_cost: round4(search_cost),
            budget_remaining: round4(state.budget_limit - total_cost),
            status: budget_level(percentage_used),
        }
    }

    fn load_ledger(path: &Path) -> CostResult<Option<CostLedger>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path).map_err(|source| CostError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save_ledger(&self, ledger: &CostLedger) -> CostResult<()> {
        if let Some(parent) = self.ledger_path.parent() {
            fs::create_dir_all(parent).map_err(|source| CostError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let bytes = serde_json::to_vec_pretty(ledger)?;
        let temp_path = self
            .ledger_path
            .with_file_name(LEDGER_TEMP_FILE);

        {
            let mut file = File::create(&temp_path).map_err(|source| CostError::Io {
                path: temp_path.clone(),
                source,
            })?;
            file.write_all(&bytes).map_err(|source| CostError::Io {
                path: temp_path.clone(),
                source,
            })?;
        }

        fs::rename(&temp_path, &self.ledger_path).map_err(|source| CostError::Io {
            path: self.ledger_path.clone(),
            source,
        })?;
        Ok(())
    }
}

impl std::fmt::Debug for CostGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CostGovernor")
            .field("ledger_path", &self.ledger_path)
            .field("records", &state.ledger.records.len())
            .field("budget_limit", &state.budget_limit)
            .finish()
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round4(total / count as f64)
}

fn percentage_of(spent: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 0.0;
    }
    (spent / limit * 1000.0).round() / 10.0
}

fn budget_level(percentage_used: f64) -> BudgetLevel {
    if percentage_used >= 100.0 {
        BudgetLevel::Critical
    } else if percentage_used >= 80.0 {
        BudgetLevel::Warning
    } else {
        BudgetLevel::Ok
    }
}

fn budget_warning(percentage_used: f64) -> Option<BudgetWarning> {
    match budget_level(percentage_used) {
        BudgetLevel::Critical => Some(BudgetWarning {
            level: BudgetLevel::Critical,
            message: format!("monthly budget exceeded ({percentage_used:.1}%)"),
            action: "pause evaluations or raise the monthly limit".to_string(),
        }),
        BudgetLevel::Warning => Some(BudgetWarning {
            level: BudgetLevel::Warning,
            message: format!("approaching monthly budget ({percentage_used:.1}%)"),
            action: "monitor spend closely".to_string(),
        }),
        BudgetLevel::Ok => None,
    }
}
