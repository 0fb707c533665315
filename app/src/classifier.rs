// ==============================================================================
// classifier.rs - Risk Classification and Genetic Advice
// ==============================================================================
// Description: Risk factor bucketing, variant pathogenicity and advice templates
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
// Thresholds:
//   risk_factor < 2.0 → low
//   risk_factor < 3.0 → moderate
//   risk_factor < 4.0 → high
//   otherwise        → very_high
// ==============================================================================

use serde::Serialize;

use crate::markers::MarkerKnowledgeBase;
use crate::models::{GeneticMarker, MarkerCategory, RiskLevel};

pub const MODERATE_THRESHOLD: f64 = 2.0;
pub const HIGH_THRESHOLD: f64 = 3.0;
pub const VERY_HIGH_THRESHOLD: f64 = 4.0;

/// Variant descriptions that never count as a risk variant
const BENIGN_TERMS: &[&str] = &[
    "benign",
    "likely_benign",
    "likely benign",
    "wild_type",
    "wildtype",
    "wild type",
    "normal",
    "negative",
    "vus",
    "uncertain",
];

/// Variant descriptions that count as a risk variant for any gene
const PATHOGENIC_TERMS: &[&str] = &[
    "pathogenic",
    "likely_pathogenic",
    "likely pathogenic",
    "risk",
    "positive",
    "mutation",
    "mutated",
    "deleterious",
    "present",
    "heterozygous",
    "homozygous",
];

/// Tokens that negate the rest of a variant description ("not expanded")
const NEGATION_TERMS: &[&str] = &["not", "no", "non", "without", "absent"];

/// Map a continuous risk factor to a discrete level (monotonic; NaN → low)
pub fn classify_risk(risk_factor: f64) -> RiskLevel {
    match risk_factor {
        r if r.is_nan() => RiskLevel::Low,
        r if r < MODERATE_THRESHOLD => RiskLevel::Low,
        r if r < HIGH_THRESHOLD => RiskLevel::Moderate,
        r if r < VERY_HIGH_THRESHOLD => RiskLevel::High,
        _ => RiskLevel::VeryHigh,
    }
}

/// Decide whether an observed variant counts as a risk variant for `gene`.
///
/// Absent or blank variants, benign classifications and negated descriptions
/// are never pathogenic. Generic pathogenic classifications count for every
/// gene; otherwise one of the variant's allele tokens must equal one of the
/// marker's risk alleles.
pub fn variant_is_pathogenic(
    kb: &MarkerKnowledgeBase,
    gene: &str,
    variant: Option<&str>,
) -> bool {
    let variant = match variant.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_lowercase(),
        _ => return false,
    };

    if BENIGN_TERMS.contains(&variant.as_str()) || is_negated(&variant) {
        return false;
    }

    if PATHOGENIC_TERMS.contains(&variant.as_str()) {
        return true;
    }

    kb.lookup(gene)
        .map(|marker| carries_risk_allele(marker, &variant))
        .unwrap_or(false)
}

/// Allele tokens of a genotype string: "e3/e4" → ["e3", "e4"]
fn allele_tokens(variant_lower: &str) -> impl Iterator<Item = &str> {
    variant_lower
        .split(|c: char| c == '/' || c == ';' || c == ',' || c == '|' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

fn is_negated(variant_lower: &str) -> bool {
    allele_tokens(variant_lower).any(|token| {
        NEGATION_TERMS.contains(&token)
            || token.starts_with("non-")
            || token.starts_with("non_")
            || token.starts_with("not_")
    })
}

fn carries_risk_allele(marker: &GeneticMarker, variant_lower: &str) -> bool {
    allele_tokens(variant_lower).any(|token| {
        marker
            .risk_alleles
            .iter()
            .any(|allele| allele.to_lowercase() == token)
    })
}

/// Advice strings for a gene/variant pair; empty for unknown genes or
/// markers whose category has no template.
pub fn genetic_advice(kb: &MarkerKnowledgeBase, gene: &str, variant: Option<&str>) -> Vec<String> {
    let Some(marker) = kb.lookup(gene) else {
        return Vec::new();
    };

    let conditions = humanize_conditions(&marker.conditions);
    let mut advice = match marker.category {
        MarkerCategory::Cancer => vec![
            format!("Schedule enhanced cancer screening for {}", conditions),
            "Discuss risk-reducing options and chemoprevention with an oncologist".to_string(),
        ],
        MarkerCategory::Cardiovascular => vec![
            format!("Get a lipid panel and cardiovascular assessment ({})", conditions),
            "Follow a heart-healthy diet low in saturated fat".to_string(),
        ],
        MarkerCategory::Neurodegenerative => vec![
            format!("Discuss cognitive and neurological monitoring for {}", conditions),
            "Stay physically and mentally active to support brain health".to_string(),
        ],
        MarkerCategory::Metabolic => vec![
            format!("Screen periodically for {}", conditions),
            "Maintain a healthy weight and balanced diet".to_string(),
        ],
        MarkerCategory::Autoimmune => vec![format!(
            "Report persistent joint, skin or digestive symptoms early; elevated risk for {}",
            conditions
        )],
        MarkerCategory::Pharmacogenetic => vec![format!(
            "Share your {} result with prescribers; it affects {}",
            marker.gene, conditions
        )],
        MarkerCategory::Other => return Vec::new(),
    };

    if classify_risk(marker.risk_factor) >= RiskLevel::High {
        let variant = variant.map(str::trim).filter(|v| !v.is_empty());
        advice.push(match variant {
            Some(v) => format!("Consider genetic counseling regarding your {} {} variant", marker.gene, v),
            None => format!("Consider genetic counseling regarding your {} variant", marker.gene),
        });
    }

    advice
}

fn humanize_conditions(conditions: &[String]) -> String {
    conditions
        .iter()
        .map(|c| c.replace('_', " "))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Features handed to an injected risk scorer
#[derive(Debug, Clone, Serialize)]
pub struct RiskFeatures<'a> {
    pub gene: &'a str,
    pub variant: Option<&'a str>,
    pub category: MarkerCategory,
    pub base_risk_factor: f64,
    pub condition_count: usize,
}

/// Pluggable statistical scoring; the rule-based marker factor is used when
/// no scorer is configured or the score is unusable.
pub trait RiskScorer: Send + Sync {
    fn score(&self, features: &RiskFeatures<'_>) -> f64;
}
