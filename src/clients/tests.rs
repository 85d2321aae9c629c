use super::mock::{MockAiClient, MockIngestor, MockSearchClient};
use super::summary::*;
use super::*;
use tempfile::TempDir;

#[test]
fn test_parse_plain_json() {
    let summary = parse_ai_summary(
        r#"{"recommendation": "PROCEED", "confidence": "High", "priority": "Medium",
            "key_strengths": ["Strong local presence"], "key_concerns": []}"#,
    );

    assert!(summary.is_structured());
    let verdict = summary.verdict();
    assert_eq!(verdict.recommendation, AiRecommendation::Proceed);
    assert_eq!(verdict.confidence, Confidence::High);
    assert_eq!(verdict.priority, Priority::Medium);
    assert_eq!(verdict.key_strengths, vec!["Strong local presence"]);
}

#[test]
fn test_parse_fenced_json() {
    let summary = parse_ai_summary(
        "```json\n{\"recommendation\": \"consider\", \"confidence\": \"medium\"}\n```",
    );
    assert!(summary.is_structured());
    assert_eq!(summary.verdict().recommendation, AiRecommendation::Consider);
    assert_eq!(summary.verdict().confidence, Confidence::Medium);
}

#[test]
fn test_missing_fields_default_conservative() {
    let summary = parse_ai_summary("{}");
    assert!(summary.is_structured());
    let verdict = summary.verdict();
    assert_eq!(verdict.recommendation, AiRecommendation::Skip);
    assert_eq!(verdict.confidence, Confidence::Low);
    assert_eq!(verdict.priority, Priority::Low);
    assert!(verdict.key_strengths.is_empty());
}

#[test]
fn test_bilingual_executive_summary_object() {
    let summary =
        parse_ai_summary(r#"{"executive_summary": {"ar": "ملخص", "en": "Summary"}}"#);
    let text = summary.verdict().executive_summary.clone().unwrap();
    assert!(text.contains("ملخص"));
    assert!(text.contains("Summary"));
}

#[test]
fn test_prose_falls_back_to_keywords() {
    let summary = parse_ai_summary(
        "We recommend you proceed with high confidence.\n\
         - The main strength is deep sector experience with similar projects.\n\
         - A key risk is the aggressive delivery schedule set by the buyer.",
    );

    assert!(!summary.is_structured());
    let verdict = summary.verdict();
    assert_eq!(verdict.recommendation, AiRecommendation::Proceed);
    assert_eq!(verdict.confidence, Confidence::High);
    assert_eq!(verdict.key_strengths.len(), 1);
    assert_eq!(verdict.key_concerns.len(), 1);
    assert!(verdict.key_strengths[0].starts_with("The main strength"));
}

#[test]
fn test_arabic_keywords_drive_fallback() {
    let summary = parse_ai_summary("هذا العطاء مناسب جداً للشركة والثقة عالية");
    assert_eq!(summary.verdict().recommendation, AiRecommendation::Proceed);
    assert_eq!(summary.verdict().confidence, Confidence::High);
}

#[test]
fn test_prose_without_signals_is_skip_low() {
    let summary = parse_ai_summary("Nothing conclusive here.");
    assert_eq!(summary.verdict().recommendation, AiRecommendation::Skip);
    assert_eq!(summary.verdict().confidence, Confidence::Low);
}

#[test]
fn test_fallback_lines_are_bounded() {
    let mut text = String::from("consider this\n");
    for i in 0..10 {
        text.push_str(&format!("- strength number {i} of the offering is notable\n"));
    }
    let long_line = format!("- strength: {}\n", "x".repeat(500));
    text.push_str(&long_line);

    let verdict = parse_ai_summary(&text);
    let strengths = &verdict.verdict().key_strengths;
    assert_eq!(strengths.len(), 5);
    assert!(strengths.iter().all(|s| s.chars().count() <= 200));
}

#[tokio::test]
async fn test_mock_ingestor_reads_text_files_in_order() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("b.txt"), "second part").unwrap();
    std::fs::write(dir.path().join("a.md"), "first part").unwrap();
    std::fs::write(dir.path().join("scan.pdf"), b"\x25PDF").unwrap();

    let docs = MockIngestor.ingest(dir.path()).await.unwrap();
    assert_eq!(docs.files, vec!["a.md", "b.txt"]);
    assert_eq!(docs.combined_text, "first part\n\nsecond part");
}

#[tokio::test]
async fn test_mock_ingestor_missing_folder_errors() {
    let err = MockIngestor
        .ingest(std::path::Path::new("/no/such/folder"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Io { .. }));
}

#[tokio::test]
async fn test_mock_ai_structured_parses_structured() {
    let response = MockAiClient::structured().analyze("prompt").await.unwrap();
    assert!(response.output_tokens > 0);
    assert!(parse_ai_summary(&response.text).is_structured());
}

#[tokio::test]
async fn test_mock_search_echoes_query() {
    let value = MockSearchClient::new().search("similar tenders", 5).await.unwrap();
    assert_eq!(value["query"], "similar tenders");
    assert!(value["results"].as_array().is_some());
}
