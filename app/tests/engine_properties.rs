// ==============================================================================
// engine_properties.rs - Recommendation Engine Integration Tests
// ==============================================================================
// Description: End-to-end behaviour of the public engine API
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use serde_json::json;
use std::sync::Arc;

use health_recommender::{
    classify_risk, generate_recommendations, AggregateInput, Category, RecommendationEngine,
    RiskFeatures, RiskLevel, RiskScorer,
};

fn from_json(value: serde_json::Value) -> AggregateInput {
    AggregateInput::from_json(&value).unwrap()
}

#[test]
fn risk_classification_is_monotonic() {
    let mut previous = classify_risk(0.0);
    let mut factor = 0.0;
    while factor <= 6.0 {
        let level = classify_risk(factor);
        assert!(level >= previous, "level dropped at {}", factor);
        previous = level;
        factor += 0.05;
    }
    assert_eq!(previous, RiskLevel::VeryHigh);
}

#[test]
fn empty_input_yields_six_empty_categories() {
    let set = generate_recommendations(&from_json(json!({}))).unwrap();

    let value = serde_json::to_value(&set).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["critical", "high_priority", "preventive", "lifestyle", "genetic", "monitoring"]
    );
    assert!(set.is_empty());
}

#[test]
fn pathogenic_brca1_adds_cancer_screening() {
    let set = generate_recommendations(&from_json(json!({
        "genetic_data": {"BRCA1": {"variant": "pathogenic"}}
    })))
    .unwrap();

    assert!(set.genetic.iter().any(|r| r.contains("cancer screening")));
    assert!(set.genetic.iter().any(|r| r.contains("genetic counseling")));
}

#[test]
fn unknown_gene_and_benign_variant_are_silent() {
    let set = generate_recommendations(&from_json(json!({
        "genetic_data": {
            "UNKNOWN_GENE": {"variant": "pathogenic"},
            "BRCA2": {"variant": "benign"}
        }
    })))
    .unwrap();

    assert!(set.genetic.is_empty());
    assert!(set.is_empty());
}

#[test]
fn exercise_threshold() {
    let low = generate_recommendations(&from_json(json!({"lifestyle_data": {"exercise": 100}}))).unwrap();
    assert_eq!(low.lifestyle.len(), 1);
    assert!(low.lifestyle[0].contains("physical activity"));

    let enough = generate_recommendations(&from_json(json!({"lifestyle_data": {"exercise": 200}}))).unwrap();
    assert!(enough.lifestyle.is_empty());
}

#[test]
fn smoking_adds_cessation_advice() {
    let set = generate_recommendations(&from_json(json!({"lifestyle_data": {"smoking": true}}))).unwrap();
    assert_eq!(set.lifestyle.len(), 1);
    assert!(set.lifestyle[0].contains("cessation"));
}

#[test]
fn genetically_corroborated_condition_is_escalated() {
    // APOE e4 is a high (not very high) finding
    let high = generate_recommendations(&from_json(json!({
        "genetic_data": {"APOE": {"variant": "e4"}},
        "medical_history": {"chronic_conditions": ["alzheimers_disease"]}
    })))
    .unwrap();
    assert_eq!(high.high_priority.len(), 1);
    assert!(high.critical.is_empty());

    let critical = generate_recommendations(&from_json(json!({
        "genetic_data": {"BRCA1": {"variant": "pathogenic"}},
        "medical_history": {"chronic_conditions": ["breast cancer"]}
    })))
    .unwrap();
    assert_eq!(critical.critical.len(), 1);
    assert!(critical.high_priority.is_empty());
}

#[test]
fn uncorroborated_condition_is_not_escalated() {
    let set = generate_recommendations(&from_json(json!({
        "medical_history": {"chronic_conditions": ["hypertension"]}
    })))
    .unwrap();

    assert!(set.critical.is_empty());
    assert!(set.high_priority.is_empty());
    assert_eq!(set.monitoring.len(), 1);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let input = from_json(json!({
        "genetic_data": {"BRCA1": {"variant": "pathogenic"}, "APOE": {"variant": "e4"}},
        "lifestyle_data": {"smoking": true, "exercise": 30, "diet": "unhealthy"},
        "medical_history": {"chronic_conditions": ["diabetes"], "medications": ["warfarin"]},
        "environmental_data": {"air_quality": 160, "exposures": ["radon"]},
        "health_metrics": {"heart_rate": [{"value": 110, "timestamp": "2024-03-20T10:00:00Z"}]}
    }));

    let engine = RecommendationEngine::new();
    let first = serde_json::to_string(&engine.generate_recommendations(&input).unwrap()).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_string(&engine.generate_recommendations(&input).unwrap()).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn genetic_output_follows_document_order() {
    let forward = generate_recommendations(&from_json(json!({
        "genetic_data": {"BRCA1": {"variant": "pathogenic"}, "APOE": {"variant": "e4"}}
    })))
    .unwrap();
    let reversed = generate_recommendations(&from_json(json!({
        "genetic_data": {"APOE": {"variant": "e4"}, "BRCA1": {"variant": "pathogenic"}}
    })))
    .unwrap();

    assert!(forward.genetic[0].contains("cancer screening"));
    assert!(reversed.genetic[0].contains("cognitive"));
    assert_eq!(forward.genetic.len(), reversed.genetic.len());
}

#[test]
fn repeated_text_is_kept_by_default() {
    let set = generate_recommendations(&from_json(json!({
        "medical_history": {"family_history": ["diabetes", "diabetes"]}
    })))
    .unwrap();

    assert_eq!(set.monitoring.len(), 2);
    assert_eq!(set.monitoring[0], set.monitoring[1]);
}

#[test]
fn shared_engine_is_consistent_across_threads() {
    let engine = RecommendationEngine::new();
    let input = from_json(json!({
        "genetic_data": {"BRCA1": {"variant": "pathogenic"}},
        "lifestyle_data": {"smoking": true}
    }));
    let expected = engine.generate_recommendations(&input).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| engine.generate_recommendations(&input).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

struct FlatScorer(f64);

impl RiskScorer for FlatScorer {
    fn score(&self, _features: &RiskFeatures<'_>) -> f64 {
        self.0
    }
}

#[test]
fn injected_scorer_changes_risk_level() {
    let input = from_json(json!({"genetic_data": {"BRCA1": {"variant": "pathogenic"}}}));

    let engine = RecommendationEngine::new().with_scorer(Arc::new(FlatScorer(1.0)));
    let analysis = engine.analyze(&input).unwrap();
    assert_eq!(analysis.overall_genetic_risk, Some(RiskLevel::Low));

    // Unusable scores fall back to the marker's own factor
    let engine = RecommendationEngine::new().with_scorer(Arc::new(FlatScorer(f64::NAN)));
    let analysis = engine.analyze(&input).unwrap();
    assert_eq!(analysis.overall_genetic_risk, Some(RiskLevel::VeryHigh));
}

#[test]
fn records_cover_every_category() {
    let analysis = RecommendationEngine::new()
        .analyze(&from_json(json!({
            "genetic_data": {"BRCA1": {"variant": "pathogenic"}},
            "lifestyle_data": {"smoking": true},
            "medical_history": {"chronic_conditions": ["breast_cancer", "asthma"], "family_history": {"diabetes": ["mother"]}},
            "environmental_data": {"uv_index": 9},
            "health_metrics": {"blood_oxygen": 92}
        })))
        .unwrap();

    for category in Category::ALL {
        assert!(
            analysis.records.iter().any(|r| r.category == category),
            "no record in {}",
            category.as_str()
        );
    }
    assert_eq!(analysis.records.len(), analysis.recommendations.len());
}

#[test]
fn extreme_vitals_are_never_quieter_than_borderline_ones() {
    for (name, borderline, extreme) in [
        ("blood_oxygen", 85, 75),
        ("blood_pressure_systolic", 185, 220),
        ("body_temperature", 35, 33),
    ] {
        let near = generate_recommendations(&from_json(json!({"health_metrics": {name: borderline}}))).unwrap();
        let far = generate_recommendations(&from_json(json!({"health_metrics": {name: extreme}}))).unwrap();

        assert_eq!(far.critical.len(), 1, "{} {}", name, extreme);
        assert!(far.critical.len() >= near.critical.len());
    }
}
