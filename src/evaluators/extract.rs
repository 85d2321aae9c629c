//! Regex and keyword extraction over bilingual (Arabic/English) tender text.
//!
//! Heuristic by nature; everything lives behind [`Extractor`] so a stricter
//! parser or model-based extraction can replace it without touching the
//! evaluators.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static MONTHS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:شهر|شهور|months?)").unwrap());

static YEARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:سنة|سنوات|years?)").unwrap());

static AMOUNT_BEFORE_CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)\s*(?:ريال|SAR)").unwrap());

static AMOUNT_AFTER_CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:ريال|SAR)\s*(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)").unwrap());

static AMOUNT_MILLIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,3}(?:,\d{3})*(?:\.\d+)?)\s*(?:مليون|million)").unwrap());

static CERTIFICATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ISO\s*\d+|CITC|PMP|CMMI|SADAIA|شهادة\s+[\w\s]+").unwrap()
});

static CLASSIFICATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:تصنيف|classification|code)\s*:?\s*(\d{3,4})").unwrap()
});

static EXPERIENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:سنوات?|years?)\s*(?:خبرة|experience)|(?:خبرة|experience)\s*(?:لا\s*تقل\s*عن|not less than|minimum)\s*(\d+)")
        .unwrap()
});

static TEAM_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:موظف|موظفين|employees?|staff|persons?)|(?:فريق|team)\s*(?:من|of)\s*(\d+)")
        .unwrap()
});

/// Technology names worth matching against company capabilities.
const TECH_KEYWORDS: &[&str] = &[
    "Python",
    "Java",
    "JavaScript",
    "React",
    "Angular",
    "Vue",
    "SQL",
    "NoSQL",
    "MongoDB",
    "PostgreSQL",
    "Oracle",
    "AWS",
    "Azure",
    "Google Cloud",
    "Docker",
    "Kubernetes",
    "AI",
    "Machine Learning",
    "Deep Learning",
    "Blockchain",
    "IoT",
    "Cloud",
    "Mobile",
];

/// Broad sector of the procured work, driving cost heuristics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    It,
    Construction,
    Consulting,
    Maintenance,
    #[default]
    General,
}

impl ProjectType {
    /// Baseline team size for a project of this type.
    pub fn base_team_size(self) -> u32 {
        match self {
            ProjectType::It => 8,
            ProjectType::Construction => 15,
            ProjectType::Consulting => 5,
            ProjectType::Maintenance => 4,
            ProjectType::General => 6,
        }
    }
}

/// Default assumed duration when the text names none.
pub const DEFAULT_DURATION_MONTHS: u32 = 12;

/// Heuristic bilingual text extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor;

impl Extractor {
    /// Project duration in months; years are converted, default 12.
    pub fn duration_months(&self, text: &str) -> u32 {
        if let Some(caps) = MONTHS_RE.captures(text) {
            if let Ok(months) = caps[1].parse() {
                return months;
            }
        }
        if let Some(caps) = YEARS_RE.captures(text) {
            if let Ok(years) = caps[1].parse::<u32>() {
                return years * 12;
            }
        }
        DEFAULT_DURATION_MONTHS
    }

    /// Classifies the work by sector keywords.
    pub fn project_type(&self, text: &str) -> ProjectType {
        let lower = text.to_lowercase();
        let groups: [(ProjectType, &[&str]); 4] = [
            (
                ProjectType::It,
                &["تقنية", "برمجة", "نظام", "software", "it", "system", "application"],
            ),
            (
                ProjectType::Construction,
                &["بناء", "تشييد", "إنشاء", "construction", "building"],
            ),
            (
                ProjectType::Consulting,
                &["استشار", "دراسة", "consulting", "advisory"],
            ),
            (
                ProjectType::Maintenance,
                &["صيانة", "دعم", "maintenance", "support"],
            ),
        ];
        for (project_type, words) in groups {
            if words.iter().any(|w| lower.contains(w)) {
                return project_type;
            }
        }
        ProjectType::General
    }

    /// Every monetary amount found in the text, in SAR.
    ///
    /// A `million` marker multiplies only its own amount, so mixed-unit
    /// texts stay coherent.
    pub fn budget_candidates(&self, text: &str) -> Vec<f64> {
        let mut amounts = Vec::new();

        for re in [&*AMOUNT_BEFORE_CURRENCY_RE, &*AMOUNT_AFTER_CURRENCY_RE] {
            for caps in re.captures_iter(text) {
                if let Some(amount) = parse_amount(&caps[1]) {
                    amounts.push(amount);
                }
            }
        }
        for caps in AMOUNT_MILLIONS_RE.captures_iter(text) {
            if let Some(amount) = parse_amount(&caps[1]) {
                amounts.push(amount * 1_000_000.0);
            }
        }

        amounts.sort_by(|a, b| a.total_cmp(b));
        amounts
    }

    /// The stated budget: the largest amount mentioned, if any.
    pub fn stated_budget(&self, text: &str) -> Option<f64> {
        self.budget_candidates(text).last().copied()
    }

    /// Required certification names, deduplicated in first-seen order.
    pub fn certifications(&self, text: &str) -> Vec<String> {
        let mut certs: Vec<String> = Vec::new();
        for m in CERTIFICATION_RE.find_iter(text) {
            let cert = m.as_str().trim().to_string();
            if !certs.iter().any(|c| c.eq_ignore_ascii_case(&cert)) {
                certs.push(cert);
            }
        }
        certs
    }

    /// Required classification codes.
    pub fn classification_codes(&self, text: &str) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for caps in CLASSIFICATION_RE.captures_iter(text) {
            let code = caps[1].to_string();
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        codes
    }

    /// Required years of experience, when stated.
    pub fn experience_years(&self, text: &str) -> Option<u32> {
        let caps = EXPERIENCE_RE.captures(text)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Technologies named in the text.
    pub fn technologies(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        TECH_KEYWORDS
            .iter()
            .filter(|tech| lower.contains(&tech.to_lowercase()))
            .map(|tech| tech.to_string())
            .collect()
    }

    /// Required team size, when stated.
    pub fn team_size(&self, text: &str) -> Option<u32> {
        let caps = TEAM_SIZE_RE.captures(text)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Whether the scope reads large/comprehensive.
    pub fn large_scope(&self, text: &str) -> bool {
        contains_any(text, &["كبير", "شامل", "large", "comprehensive"])
    }

    /// Whether specialized subcontractors are implied.
    pub fn needs_subcontractors(&self, text: &str) -> bool {
        contains_any(text, &["متخصص", "specialized", "expert", "استشاري"])
    }

    /// Whether special licensing is implied.
    pub fn needs_licensing(&self, text: &str) -> bool {
        contains_any(text, &["رخصة", "ترخيص", "license", "certification", "شهادة"])
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    let lower = text.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}
