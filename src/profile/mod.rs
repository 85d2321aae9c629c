//! Company profile: the immutable description of the bidding company.
//!
//! Loaded once at startup from a JSON file and shared read-only across
//! workers behind an `Arc`. Evaluators consult it for certification and
//! classification matching, team capacity, and pricing strategy; the AI
//! prompt embeds its text summary.

pub mod error;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use error::ProfileError;

/// Capability within one market sector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectorCapability {
    /// Years of experience in the sector.
    #[serde(default)]
    pub experience_years: u32,
    /// Technologies the company works with in this sector.
    #[serde(default)]
    pub technologies: Vec<String>,
    /// Largest project value the company can take on, in SAR.
    #[serde(default)]
    pub max_project_value: f64,
}

/// A certification the company holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Certification {
    /// Certification name, e.g. `ISO 9001`.
    pub name: String,
    /// Issuing body, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// An official contractor classification the company holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    /// Classification code.
    pub code: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Classification grade, when graded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

/// Margin and cost-loading strategy used when pricing a bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingStrategy {
    /// Lowest acceptable profit margin.
    pub minimum_margin: f64,
    /// Margin the company aims for.
    pub target_margin: f64,
    /// Margin used when the position is strong.
    pub premium_margin: f64,
    /// Overhead loading applied on top of direct cost.
    pub overhead_rate: f64,
    /// Contingency loading applied on top of direct cost.
    pub contingency_rate: f64,
    /// Mean fully-loaded monthly salary per team member, in SAR.
    pub average_monthly_salary: f64,
}

impl Default for PricingStrategy {
    fn default() -> Self {
        Self {
            minimum_margin: 0.10,
            target_margin: 0.20,
            premium_margin: 0.30,
            overhead_rate: 0.15,
            contingency_rate: 0.08,
            average_monthly_salary: 15_000.0,
        }
    }
}

/// Immutable company profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    /// Company name.
    pub company_name: String,
    /// Sector name → capability.
    pub capabilities: BTreeMap<String, SectorCapability>,
    /// Certifications held.
    pub certifications: Vec<Certification>,
    /// Contractor classifications held.
    pub classifications: Vec<Classification>,
    /// Role → headcount.
    pub team: BTreeMap<String, u32>,
    /// Pricing strategy.
    pub pricing_strategy: PricingStrategy,
    /// Competitive advantages, free text.
    pub competitive_advantages: Vec<String>,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            company_name: "Unnamed Company".to_string(),
            capabilities: BTreeMap::new(),
            certifications: Vec::new(),
            classifications: Vec::new(),
            team: BTreeMap::new(),
            pricing_strategy: PricingStrategy::default(),
            competitive_advantages: Vec::new(),
        }
    }
}

impl CompanyProfile {
    /// Loads a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let bytes = fs::read(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let profile: Self =
            serde_json::from_slice(&bytes).map_err(|source| ProfileError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), company = %profile.company_name, "company profile loaded");
        Ok(profile)
    }

    /// Loads a profile when a path is configured, falling back to defaults.
    ///
    /// A configured-but-broken profile file is a warning, not a startup
    /// failure; evaluations then run against the default profile.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load(path).unwrap_or_else(|e| {
                warn!(error = %e, "falling back to default company profile");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Total headcount across all roles.
    pub fn total_team_size(&self) -> u32 {
        self.team.values().sum()
    }

    /// Whether the company holds a certification whose name contains `name`
    /// (case-insensitive).
    pub fn has_certification(&self, name: &str) -> bool {
        let needle = name.to_lowercase();
        self.certifications
            .iter()
            .any(|c| c.name.to_lowercase().contains(&needle))
    }

    /// Whether the company holds the classification `code` exactly.
    pub fn matches_classification(&self, code: &str) -> bool {
        self.classifications.iter().any(|c| c.code == code)
    }

    /// Text summary embedded in the AI prompt.
    pub fn ai_context_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Company Profile:");
        let _ = writeln!(out, "- Name: {}", self.company_name);
        let _ = writeln!(out, "- Team size: {} professionals", self.total_team_size());

        let _ = writeln!(out, "\nCertifications:");
        if self.certifications.is_empty() {
            let _ = writeln!(out, "- None listed");
        }
        for cert in self.certifications.iter().take(5) {
            let _ = writeln!(out, "- {}", cert.name);
        }

        let _ = writeln!(out, "\nClassifications:");
        if self.classifications.is_empty() {
            let _ = writeln!(out, "- None listed");
        }
        for class in self.classifications.iter().take(5) {
            let grade = class.grade.as_deref().unwrap_or("ungraded");
            let _ = writeln!(out, "- {}: {} ({})", class.code, class.description, grade);
        }

        let _ = writeln!(out, "\nCore Capabilities:");
        if self.capabilities.is_empty() {
            let _ = writeln!(out, "- None listed");
        }
        for (sector, cap) in self.capabilities.iter().take(6) {
            let _ = writeln!(
                out,
                "- {}: {} years, up to SAR {:.1}M",
                sector,
                cap.experience_years,
                cap.max_project_value / 1_000_000.0
            );
        }

        let _ = writeln!(out, "\nCompetitive Advantages:");
        if self.competitive_advantages.is_empty() {
            let _ = writeln!(out, "- None listed");
        }
        for advantage in self.competitive_advantages.iter().take(5) {
            let _ = writeln!(out, "- {advantage}");
        }

        let strategy = &self.pricing_strategy;
        let _ = writeln!(out, "\nPricing Strategy:");
        let _ = writeln!(out, "- Target margin: {:.0}%", strategy.target_margin * 100.0);
        let _ = writeln!(out, "- Overhead: {:.0}%", strategy.overhead_rate * 100.0);
        let _ = write!(out, "- Contingency: {:.0}%", strategy.contingency_rate * 100.0);

        out
    }
}
