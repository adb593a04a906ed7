//! Matching-core behavior tests against the public API.

use campusguide::i18n;
use campusguide::matcher::{best_matches, find_matching_entity, similarity};

#[test]
fn test_similarity_reflexive_and_empty() {
    for s in ["", "legon", "Korle Bu Campus", "paracetamol 500mg"] {
        assert_eq!(similarity(s, s), 1.0);
    }
    assert_eq!(similarity("", ""), 1.0);
}

#[test]
fn test_similarity_one_substitution_in_three() {
    let score = similarity("abc", "abd");
    assert!((score - 0.6667).abs() < 1e-3, "got {}", score);
}

#[test]
fn test_similarity_symmetric_and_bounded() {
    let samples = [
        ("legon", "Legon Campus"),
        ("korle bu", "Korle Bu Campus"),
        ("xyzxyz", "Balme Library"),
        ("", "night market"),
    ];
    for (a, b) in samples {
        let ab = similarity(a, b);
        let ba = similarity(b, a);
        assert_eq!(ab, ba, "{} / {}", a, b);
        assert!((0.0..=1.0).contains(&ab));
    }
}

#[test]
fn test_best_matches_containment_beats_edit_distance() {
    let candidates = vec!["Legon Campus".to_string(), "Korle Bu Campus".to_string()];
    let ranked = best_matches("legon", &candidates);
    assert_eq!(ranked[0].value, "Legon Campus");
    assert!(ranked[0].score >= 0.9);
}

#[test]
fn test_best_matches_is_total_and_sorted() {
    let candidates = vec![
        "Balme Library".to_string(),
        "Great Hall".to_string(),
        "Night Market".to_string(),
        "Akuafo Hall".to_string(),
        "Commonwealth Hall".to_string(),
    ];
    let ranked = best_matches("great hal", &candidates);

    assert_eq!(ranked.len(), candidates.len());
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for candidate in &candidates {
        assert_eq!(ranked.iter().filter(|m| &m.value == candidate).count(), 1);
    }
    assert_eq!(ranked[0].value, "Great Hall");
}

#[test]
fn test_find_matching_entity_resolves_canonical() {
    let found = find_matching_entity("korle bu", i18n::campus_translations(), "en-US");
    assert_eq!(found, Some("Korle Bu Campus"));
}

#[test]
fn test_find_matching_entity_rejects_noise() {
    assert_eq!(
        find_matching_entity("xyzxyz", i18n::campus_translations(), "en-US"),
        None
    );
}

#[test]
fn test_find_matching_entity_language_fallback() {
    // No pt-BR table ships; resolution falls back and still matches
    let found = find_matching_entity("night market", i18n::campus_translations(), "pt-BR");
    assert_eq!(found, Some("Night Market"));
}

#[test]
fn test_find_matching_entity_embedded_phrase() {
    let found = find_matching_entity(
        "where is the legon library building",
        i18n::campus_translations(),
        "en-US",
    );
    assert!(found.is_some());
}
