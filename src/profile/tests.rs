use super::*;
use tempfile::TempDir;

fn sample_profile() -> CompanyProfile {
    let mut profile = CompanyProfile {
        company_name: "Falcon Systems".to_string(),
        ..CompanyProfile::default()
    };
    profile.certifications.push(Certification {
        name: "ISO 9001".to_string(),
        issuer: None,
    });
    profile.certifications.push(Certification {
        name: "CITC License".to_string(),
        issuer: Some("CITC".to_string()),
    });
    profile.classifications.push(Classification {
        code: "1010".to_string(),
        description: "IT services".to_string(),
        grade: Some("2".to_string()),
    });
    profile.team.insert("developer".to_string(), 6);
    profile.team.insert("engineer".to_string(), 3);
    profile.capabilities.insert(
        "it".to_string(),
        SectorCapability {
            experience_years: 8,
            technologies: vec!["Python".to_string(), "AWS".to_string()],
            max_project_value: 5_000_000.0,
        },
    );
    profile
}

#[test]
fn test_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile.json");
    let profile = sample_profile();
    std::fs::write(&path, serde_json::to_vec_pretty(&profile).unwrap()).unwrap();

    let loaded = CompanyProfile::load(&path).unwrap();
    assert_eq!(loaded.company_name, "Falcon Systems");
    assert_eq!(loaded.total_team_size(), 9);
    assert_eq!(loaded.capabilities["it"].experience_years, 8);
}

#[test]
fn test_load_partial_json_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile.json");
    std::fs::write(&path, br#"{"company_name": "Minimal Co"}"#).unwrap();

    let loaded = CompanyProfile::load(&path).unwrap();
    assert_eq!(loaded.company_name, "Minimal Co");
    assert_eq!(loaded.pricing_strategy.target_margin, 0.20);
    assert_eq!(loaded.pricing_strategy.minimum_margin, 0.10);
    assert!(loaded.certifications.is_empty());
}

#[test]
fn test_load_or_default_on_missing_path() {
    let profile = CompanyProfile::load_or_default(None);
    assert_eq!(profile.company_name, "Unnamed Company");

    let broken = CompanyProfile::load_or_default(Some(std::path::Path::new("/nonexistent.json")));
    assert_eq!(broken.company_name, "Unnamed Company");
}

#[test]
fn test_malformed_profile_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile.json");
    std::fs::write(&path, b"not json").unwrap();

    assert!(matches!(
        CompanyProfile::load(&path),
        Err(ProfileError::Malformed { .. })
    ));
}

#[test]
fn test_certification_matching_is_substring_and_case_insensitive() {
    let profile = sample_profile();
    assert!(profile.has_certification("iso 9001"));
    assert!(profile.has_certification("ISO"));
    assert!(profile.has_certification("citc"));
    assert!(!profile.has_certification("PMP"));
}

#[test]
fn test_classification_matching_is_exact() {
    let profile = sample_profile();
    assert!(profile.matches_classification("1010"));
    assert!(!profile.matches_classification("101"));
    assert!(!profile.matches_classification("2020"));
}

#[test]
fn test_ai_context_summary_mentions_key_facts() {
    let summary = sample_profile().ai_context_summary();
    assert!(summary.contains("Falcon Systems"));
    assert!(summary.contains("ISO 9001"));
    assert!(summary.contains("1010"));
    assert!(summary.contains("Target margin: 20%"));
    assert!(summary.contains("9 professionals"));
}

#[test]
fn test_empty_profile_summary_marks_sections_empty() {
    let summary = CompanyProfile::default().ai_context_summary();
    assert!(summary.contains("None listed"));
}
