// ==============================================================================
// genetic.rs - Genetic Risk Analyzer
// ==============================================================================
// Description: Turns observed gene variants into genetic findings
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use tracing::{debug, warn};

use crate::classifier::{
    classify_risk, genetic_advice, variant_is_pathogenic, RiskFeatures, RiskScorer,
};
use crate::markers::MarkerKnowledgeBase;
use crate::models::{GeneticData, GeneticFinding, GeneticMarker};

/// Analyze genetic data in input order.
///
/// Genes missing from the knowledge base and non-pathogenic variants are
/// skipped. When `scorer` is given its score replaces the marker risk factor
/// unless it is non-finite or non-positive.
pub fn analyze_genetic(
    kb: &MarkerKnowledgeBase,
    data: &GeneticData,
    scorer: Option<&dyn RiskScorer>,
) -> Vec<GeneticFinding> {
    let mut findings = Vec::new();

    for (gene, entry) in data.iter() {
        let Some(marker) = kb.lookup(gene) else {
            debug!("Skipping unknown gene {}", gene);
            continue;
        };

        let variant = entry.variant.as_deref();
        if !variant_is_pathogenic(kb, gene, variant) {
            debug!("{} variant {:?} not pathogenic", gene, variant);
            continue;
        }

        let risk_factor = score_marker(marker, variant, scorer);
        let finding = GeneticFinding {
            gene: marker.gene.clone(),
            variant: variant.map(str::to_string),
            category: marker.category,
            risk_factor,
            risk_level: classify_risk(risk_factor),
            conditions: marker.conditions.clone(),
            recommendations: genetic_advice(kb, gene, variant),
        };

        debug!(
            "Genetic finding: {} ({:?}, risk factor {:.2})",
            finding.gene, finding.risk_level, finding.risk_factor
        );
        findings.push(finding);
    }

    findings
}

fn score_marker(marker: &GeneticMarker, variant: Option<&str>, scorer: Option<&dyn RiskScorer>) -> f64 {
    let Some(scorer) = scorer else {
        return marker.risk_factor;
    };

    let features = RiskFeatures {
        gene: &marker.gene,
        variant,
        category: marker.category,
        base_risk_factor: marker.risk_factor,
        condition_count: marker.conditions.len(),
    };

    let score = scorer.score(&features);
    if score.is_finite() && score > 0.0 {
        score
    } else {
        warn!(
            "Risk scorer returned unusable score {} for {}, using marker risk factor",
            score, marker.gene
        );
        marker.risk_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeneticEntry, MarkerCategory, RiskLevel};

    struct FixedScorer(f64);

    impl RiskScorer for FixedScorer {
        fn score(&self, _features: &RiskFeatures<'_>) -> f64 {
            self.0
        }
    }

    fn data(entries: &[(&str, Option<&str>)]) -> GeneticData {
        entries
            .iter()
            .map(|(gene, variant)| {
                (
                    gene.to_string(),
                    GeneticEntry {
                        variant: variant.map(str::to_string),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_pathogenic_brca1_finding() {
        let kb = MarkerKnowledgeBase::builtin();
        let findings = analyze_genetic(&kb, &data(&[("BRCA1", Some("pathogenic"))]), None);

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.gene, "BRCA1");
        assert_eq!(finding.category, MarkerCategory::Cancer);
        assert_eq!(finding.risk_level, RiskLevel::VeryHigh);
        assert!(finding.conditions.contains(&"breast_cancer".to_string()));
        assert!(finding.recommendations[0].contains("cancer screening"));
    }

    #[test]
    fn test_unknown_and_benign_genes_skipped() {
        let kb = MarkerKnowledgeBase::builtin();
        let findings = analyze_genetic(
            &kb,
            &data(&[
                ("UNKNOWN_GENE", Some("pathogenic")),
                ("BRCA2", Some("benign")),
                ("LDLR", None),
            ]),
            None,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_findings_follow_input_order() {
        let kb = MarkerKnowledgeBase::builtin();
        let findings = analyze_genetic(
            &kb,
            &data(&[
                ("TCF7L2", Some("risk")),
                ("APOE", Some("e4/e4")),
                ("BRCA1", Some("pathogenic")),
            ]),
            None,
        );

        let genes: Vec<&str> = findings.iter().map(|f| f.gene.as_str()).collect();
        assert_eq!(genes, vec!["TCF7L2", "APOE", "BRCA1"]);
    }

    #[test]
    fn test_scorer_overrides_risk_factor() {
        let kb = MarkerKnowledgeBase::builtin();
        let scorer = FixedScorer(1.1);
        let findings = analyze_genetic(&kb, &data(&[("BRCA1", Some("pathogenic"))]), Some(&scorer));

        assert_eq!(findings[0].risk_factor, 1.1);
        assert_eq!(findings[0].risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_unusable_score_falls_back_to_marker() {
        let kb = MarkerKnowledgeBase::builtin();
        let scorer = FixedScorer(f64::NAN);
        let findings = analyze_genetic(&kb, &data(&[("APOE", Some("e4"))]), Some(&scorer));

        assert_eq!(findings[0].risk_factor, 3.0);
        assert_eq!(findings[0].risk_level, RiskLevel::High);
    }
}
