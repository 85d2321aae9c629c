//! Technical evaluation: requirement extraction, capability matching,
//! feasibility tiers, and risk identification.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::extract::Extractor;
use super::{Opportunity, RequirementHints};
use crate::profile::CompanyProfile;

/// Requirements pulled out of the opportunity text (or supplied as hints).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedRequirements {
    /// Required certifications.
    pub certifications: Vec<String>,
    /// Required classification codes.
    pub classification_codes: Vec<String>,
    /// Required years of experience (0 = unstated).
    pub experience_years: u32,
    /// Required technologies.
    pub technologies: Vec<String>,
    /// Required team size (0 = unstated).
    pub team_size: u32,
}

impl ExtractedRequirements {
    fn is_empty(&self) -> bool {
        self.certifications.is_empty()
            && self.classification_codes.is_empty()
            && self.experience_years == 0
            && self.technologies.is_empty()
            && self.team_size == 0
    }
}

/// Per-category match outcome against the company profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityMatch {
    /// Certifications the company holds.
    pub certifications_matched: Vec<String>,
    /// Certifications the company lacks.
    pub certifications_missing: Vec<String>,
    /// Classification codes the company holds.
    pub classifications_matched: Vec<String>,
    /// Classification codes the company lacks.
    pub classifications_missing: Vec<String>,
    /// Technologies covered by some capability.
    pub technologies_matched: Vec<String>,
    /// Technologies with no coverage.
    pub technology_gaps: Vec<String>,
    /// Company experience meets the requirement.
    pub experience_adequate: bool,
    /// Company headcount meets the requirement.
    pub team_adequate: bool,
    /// Arithmetic mean of the per-category scores, 0–100.
    pub overall_score: f64,
}

/// Qualitative feasibility tier derived from the capability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeasibilityLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl FeasibilityLevel {
    /// Tier for a 0–100 capability score.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            FeasibilityLevel::High
        } else if score >= 60.0 {
            FeasibilityLevel::Medium
        } else if score >= 40.0 {
            FeasibilityLevel::Low
        } else {
            FeasibilityLevel::VeryLow
        }
    }
}

/// Risk severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskSeverity {
    High,
    Medium,
    Low,
}

/// One identified delivery risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    /// Risk category label.
    pub category: String,
    /// Severity tier.
    pub severity: RiskSeverity,
    /// What the risk is.
    pub description: String,
    /// How to mitigate it.
    pub mitigation: String,
}

/// Full technical scorecard for one opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalScorecard {
    /// Extracted or hinted requirements.
    pub requirements: ExtractedRequirements,
    /// Match against the company profile.
    pub capability_match: CapabilityMatch,
    /// Feasibility tier for the overall score.
    pub feasibility: FeasibilityLevel,
    /// Whether delivery is plausible (score ≥ 50).
    pub can_deliver: bool,
    /// Identified risks.
    pub risks: Vec<Risk>,
    /// Advisory notes for the reviewer.
    pub notes: Vec<String>,
}

/// Rule-based technical evaluator matched against the company profile.
pub struct TechnicalEvaluator {
    profile: Arc<CompanyProfile>,
    extractor: Extractor,
}

impl TechnicalEvaluator {
    /// Creates an evaluator for `profile`.
    pub fn new(profile: Arc<CompanyProfile>) -> Self {
        Self {
            profile,
            extractor: Extractor,
        }
    }

    /// Evaluates one opportunity.
    pub fn evaluate(
        &self,
        opportunity: &Opportunity,
        hints: Option<&RequirementHints>,
    ) -> TechnicalScorecard {
        let requirements = self.gather_requirements(&opportunity.text, hints);
        let capability_match = self.match_capabilities(&requirements);
        let feasibility = FeasibilityLevel::from_score(capability_match.overall_score);
        let can_deliver = capability_match.overall_score >= 50.0;
        let risks = identify_risks(&capability_match, feasibility);
        let notes = advisory_notes(&requirements, &capability_match, &risks);

        debug!(
            opportunity_id = %opportunity.id,
            score = capability_match.overall_score,
            ?feasibility,
            risks = risks.len(),
            "technical evaluation complete"
        );

        TechnicalScorecard {
            requirements,
            capability_match,
            feasibility,
            can_deliver,
            risks,
            notes,
        }
    }

    fn gather_requirements(
        &self,
        text: &str,
        hints: Option<&RequirementHints>,
    ) -> ExtractedRequirements {
        if let Some(hints) = hints {
            return ExtractedRequirements {
                certifications: hints.certifications.clone(),
                classification_codes: hints.classification_codes.clone(),
                experience_years: hints.experience_years.unwrap_or(0),
                technologies: hints.technologies.clone(),
                team_size: hints.team_size.unwrap_or(0),
            };
        }
        ExtractedRequirements {
            certifications: self.extractor.certifications(text),
            classification_codes: self.extractor.classification_codes(text),
            experience_years: self.extractor.experience_years(text).unwrap_or(0),
            technologies: self.extractor.technologies(text),
            team_size: self.extractor.team_size(text).unwrap_or(0),
        }
    }

    fn match_capabilities(&self, requirements: &ExtractedRequirements) -> CapabilityMatch {
        let mut m = CapabilityMatch::default();
        let mut scores: Vec<f64> = Vec::new();

        for cert in &requirements.certifications {
            if self.profile.has_certification(cert) {
                m.certifications_matched.push(cert.clone());
                scores.push(100.0);
            } else {
                m.certifications_missing.push(cert.clone());
                scores.push(0.0);
            }
        }

        for code in &requirements.classification_codes {
            if self.profile.matches_classification(code) {
                m.classifications_matched.push(code.clone());
                scores.push(100.0);
            } else {
                m.classifications_missing.push(code.clone());
                scores.push(0.0);
            }
        }

        let company_experience = self
            .profile
            .capabilities
            .values()
            .map(|c| c.experience_years)
            .max()
            .unwrap_or(0);
        m.experience_adequate = company_experience >= requirements.experience_years;
        scores.push(if m.experience_adequate { 100.0 } else { 50.0 });

        if !requirements.technologies.is_empty() {
            for tech in &requirements.technologies {
                if self.covers_technology(tech) {
                    m.technologies_matched.push(tech.clone());
                } else {
                    m.technology_gaps.push(tech.clone());
                }
            }
            scores.push(
                m.technologies_matched.len() as f64 / requirements.technologies.len() as f64
                    * 100.0,
            );
        }

        m.team_adequate = requirements.team_size == 0
            || self.profile.total_team_size() >= requirements.team_size;
        scores.push(if m.team_adequate { 100.0 } else { 50.0 });

        m.overall_score = scores.iter().sum::<f64>() / scores.len() as f64;
        m
    }

    fn covers_technology(&self, tech: &str) -> bool {
        let needle = tech.to_lowercase();
        self.profile.capabilities.values().any(|cap| {
            cap.technologies
                .iter()
                .any(|t| t.to_lowercase().contains(&needle))
        })
    }
}

fn identify_risks(m: &CapabilityMatch, feasibility: FeasibilityLevel) -> Vec<Risk> {
    let mut risks = Vec::new();

    if !m.certifications_missing.is_empty() {
        risks.push(Risk {
            category: "Certification".to_string(),
            severity: RiskSeverity::High,
            description: format!(
                "Missing certifications: {}",
                m.certifications_missing.join(", ")
            ),
            mitigation: "Obtain the certifications before bidding or partner with a certified company"
                .to_string(),
        });
    }

    if !m.classifications_missing.is_empty() {
        risks.push(Risk {
            category: "Classification".to_string(),
            severity: RiskSeverity::High,
            description: format!(
                "Missing classifications: {}",
                m.classifications_missing.join(", ")
            ),
            mitigation: "Apply for the classification or partner with a classified company"
                .to_string(),
        });
    }

    if !m.technology_gaps.is_empty() {
        let shown: Vec<_> = m.technology_gaps.iter().take(5).cloned().collect();
        risks.push(Risk {
            category: "Technical Capability".to_string(),
            severity: RiskSeverity::Medium,
            description: format!("Capability gaps in: {}", shown.join(", ")),
            mitigation: "Hire experts, train staff, or subcontract the specialized work"
                .to_string(),
        });
    }

    if !m.experience_adequate {
        risks.push(Risk {
            category: "Experience".to_string(),
            severity: RiskSeverity::Medium,
            description: "Required experience level not met".to_string(),
            mitigation: "Partner with an experienced company or highlight transferable experience"
                .to_string(),
        });
    }

    if !m.team_adequate {
        risks.push(Risk {
            category: "Team Capacity".to_string(),
            severity: RiskSeverity::Medium,
            description: "Current team size may be insufficient".to_string(),
            mitigation: "Plan for hiring or use subcontractors".to_string(),
        });
    }

    if matches!(feasibility, FeasibilityLevel::Low | FeasibilityLevel::VeryLow) {
        risks.push(Risk {
            category: "Overall Feasibility".to_string(),
            severity: RiskSeverity::High,
            description: "Overall technical feasibility is low".to_string(),
            mitigation: "Reassess whether this opportunity suits the company".to_string(),
        });
    }

    risks
}

fn advisory_notes(
    requirements: &ExtractedRequirements,
    m: &CapabilityMatch,
    risks: &[Risk],
) -> Vec<String> {
    let mut notes = Vec::new();

    if requirements.is_empty() {
        notes.push(
            "no explicit technical requirements found in the documents; scoring reflects \
             capacity checks only"
                .to_string(),
        );
    }

    if m.overall_score >= 80.0 {
        notes.push("strong technical fit".to_string());
    } else if m.overall_score >= 60.0 {
        notes.push("good technical fit; address gaps before bidding".to_string());
    } else if m.overall_score >= 40.0 {
        notes.push("moderate technical fit; consider partnerships".to_string());
    } else {
        notes.push("weak technical fit; reconsider bidding".to_string());
    }

    let high_risks = risks
        .iter()
        .filter(|r| r.severity == RiskSeverity::High)
        .count();
    if high_risks > 0 {
        notes.push(format!(
            "{high_risks} high-severity risk(s) need addressing before bidding"
        ));
    }

    notes
}
