//! Tolerant parsing of language-model analysis output.
//!
//! Models are asked for plain JSON but routinely wrap it in markdown fences
//! or fall back to prose. The parser strips fences, attempts a structured
//! read, and otherwise derives a verdict from bilingual keyword scanning so
//! the pipeline always gets *some* usable summary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bounded length of each strength/concern line.
const ITEM_MAX_CHARS: usize = 200;

/// Bounded number of strengths/concerns carried forward.
const ITEM_MAX_COUNT: usize = 5;

/// Model's bid recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AiRecommendation {
    /// Bid on the opportunity.
    Proceed,
    /// Worth a closer look.
    Consider,
    /// Do not bid.
    #[default]
    Skip,
}

/// Confidence tier attached to a recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

/// Priority tier attached to a recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

/// Normalized verdict extracted from model output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiVerdict {
    /// Bid recommendation.
    pub recommendation: AiRecommendation,
    /// Confidence tier.
    pub confidence: Confidence,
    /// Priority tier.
    pub priority: Priority,
    /// One-paragraph summary, when the model provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    /// Bounded strength list.
    #[serde(default)]
    pub key_strengths: Vec<String>,
    /// Bounded concern list.
    #[serde(default)]
    pub key_concerns: Vec<String>,
    /// Structured requirements object, passed through verbatim for the
    /// evaluators to interpret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Value>,
}

/// A parsed model response, tagged by how it was obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AiSummary {
    /// The model answered with parseable JSON.
    Structured(AiVerdict),
    /// Prose answer; the verdict was derived by keyword scanning.
    RawText(AiVerdict),
}

impl AiSummary {
    /// The verdict, however it was obtained.
    pub fn verdict(&self) -> &AiVerdict {
        match self {
            AiSummary::Structured(v) | AiSummary::RawText(v) => v,
        }
    }

    /// Whether the model produced parseable JSON.
    pub fn is_structured(&self) -> bool {
        matches!(self, AiSummary::Structured(_))
    }
}

/// Parses raw model output into a summary, never failing.
pub fn parse_ai_summary(text: &str) -> AiSummary {
    let stripped = strip_code_fences(text);
    match serde_json::from_str::<Value>(stripped) {
        Ok(Value::Object(map)) => AiSummary::Structured(verdict_from_json(&map)),
        _ => AiSummary::RawText(verdict_from_keywords(text)),
    }
}

fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn verdict_from_json(map: &serde_json::Map<String, Value>) -> AiVerdict {
    let recommendation = match map.get("recommendation").and_then(Value::as_str) {
        Some(s) if s.eq_ignore_ascii_case("proceed") => AiRecommendation::Proceed,
        Some(s) if s.eq_ignore_ascii_case("consider") => AiRecommendation::Consider,
        _ => AiRecommendation::Skip,
    };

    AiVerdict {
        recommendation,
        confidence: tier_from_json(map.get("confidence")),
        priority: tier_from_json(map.get("priority")).into(),
        executive_summary: map
            .get("executive_summary")
            .map(summary_text)
            .filter(|s| !s.is_empty()),
        key_strengths: string_list(map.get("key_strengths")),
        key_concerns: string_list(map.get("key_concerns")),
        requirements: map.get("requirements").filter(|v| v.is_object()).cloned(),
    }
}

fn tier_from_json(value: Option<&Value>) -> Confidence {
    match value.and_then(Value::as_str) {
        Some(s) if s.eq_ignore_ascii_case("high") => Confidence::High,
        Some(s) if s.eq_ignore_ascii_case("medium") => Confidence::Medium,
        _ => Confidence::Low,
    }
}

impl From<Confidence> for Priority {
    fn from(tier: Confidence) -> Self {
        match tier {
            Confidence::High => Priority::High,
            Confidence::Medium => Priority::Medium,
            Confidence::Low => Priority::Low,
        }
    }
}

/// Executive summaries may be a string or a `{lang: text}` object.
fn summary_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .values()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" / "),
        _ => String::new(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(|s| truncate_chars(s, ITEM_MAX_CHARS))
        .take(ITEM_MAX_COUNT)
        .collect()
}

fn verdict_from_keywords(text: &str) -> AiVerdict {
    let lower = text.to_lowercase();

    let recommendation = if contains_any(
        &lower,
        &["proceed", "yes", "recommended", "يُنصح", "نعم", "مناسب"],
    ) {
        AiRecommendation::Proceed
    } else if contains_any(&lower, &["consider", "maybe", "possible", "محتمل", "ربما"]) {
        AiRecommendation::Consider
    } else {
        AiRecommendation::Skip
    };

    let confidence = if contains_any(
        &lower,
        &["high confidence", "very confident", "عالية", "كبيرة"],
    ) {
        Confidence::High
    } else if contains_any(&lower, &["medium", "moderate", "متوسطة"]) {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    let priority = if contains_any(&lower, &["high priority", "urgent", "عالية", "عاجل"]) {
        Priority::High
    } else if contains_any(&lower, &["medium priority", "moderate", "متوسطة"]) {
        Priority::Medium
    } else {
        Priority::Low
    };

    AiVerdict {
        recommendation,
        confidence,
        priority,
        executive_summary: None,
        key_strengths: scan_lines(text, &["strong", "strength", "advantage", "قوة", "مميز"]),
        key_concerns: scan_lines(text, &["risk", "concern", "challenge", "مخاطر", "تحدي"]),
        requirements: None,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Collects lines mentioning any keyword, stripped of list markers.
///
/// Lines under 10 characters are noise; longer ones are truncated.
fn scan_lines(text: &str, keywords: &[&str]) -> Vec<String> {
    let mut items = Vec::new();
    for line in text.lines() {
        let lower = line.to_lowercase();
        if !contains_any(&lower, keywords) {
            continue;
        }
        let cleaned = line.trim().trim_start_matches(['-', '*', '•', ' ']).trim();
        if cleaned.chars().count() > 10 {
            items.push(truncate_chars(cleaned, ITEM_MAX_CHARS));
            if items.len() >= ITEM_MAX_COUNT {
                break;
            }
        }
    }
    items
}

/// Truncates on a character boundary; Arabic text makes byte slicing unsafe.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
