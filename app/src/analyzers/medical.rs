// ==============================================================================
// medical.rs - Medical History Analyzer
// ==============================================================================
// Description: Chronic conditions, family history and medications, escalated
//              when corroborated by genetic findings
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
// Escalation:
//   corroborating finding very_high → Priority::Critical
//   any other corroborating finding → Priority::Elevated
//   no corroboration               → Priority::Routine
// Emission order: chronic conditions → family history → medications
// ==============================================================================

use tracing::debug;

use crate::models::{Emission, GeneticFinding, MedicalHistory, Priority};

/// Medication count at which a routine medication review is suggested
const POLYPHARMACY_THRESHOLD: usize = 5;

struct KnownCondition {
    keyword: &'static str,
    /// Other names (including genetic finding conditions) for the same disease
    aliases: &'static [&'static str],
    advice: &'static str,
}

impl KnownCondition {
    fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.keyword).chain(self.aliases.iter().copied())
    }
}

const KNOWN_CONDITIONS: &[KnownCondition] = &[
    KnownCondition {
        keyword: "hypertension",
        aliases: &["high_blood_pressure"],
        advice: "Monitor blood pressure at home and review it at regular check-ups",
    },
    KnownCondition {
        keyword: "diabetes",
        aliases: &["type2_diabetes", "type1_diabetes", "diabetes_mellitus"],
        advice: "Monitor blood glucose and HbA1c regularly and keep annual eye and foot exams",
    },
    KnownCondition {
        keyword: "high_cholesterol",
        aliases: &["hypercholesterolemia", "hyperlipidemia"],
        advice: "Check your lipid panel regularly and review statin therapy with your doctor",
    },
    KnownCondition {
        keyword: "heart_disease",
        aliases: &[
            "coronary_artery_disease",
            "cardiovascular_disease",
            "hypertrophic_cardiomyopathy",
        ],
        advice: "Keep regular cardiology follow-ups and report chest pain or breathlessness promptly",
    },
    KnownCondition {
        keyword: "obesity",
        aliases: &[],
        advice: "Track weight and waist circumference and consider a supervised weight management plan",
    },
    KnownCondition {
        keyword: "asthma",
        aliases: &[],
        advice: "Review your asthma action plan and inhaler technique at each check-up",
    },
    KnownCondition {
        keyword: "depression",
        aliases: &["major_depressive_disorder"],
        advice: "Keep regular mental health check-ins and reach out early if symptoms return",
    },
];

/// Medications whose response depends on a pharmacogenetic marker
const DRUG_GENES: &[(&str, &[&str])] = &[
    ("clopidogrel", &["CYP2C19"]),
    ("codeine", &["CYP2D6"]),
    ("tamoxifen", &["CYP2D6"]),
    ("warfarin", &["CYP2C9", "VKORC1"]),
    ("simvastatin", &["SLCO1B1"]),
    ("atorvastatin", &["SLCO1B1"]),
    ("fluorouracil", &["DPYD"]),
    ("capecitabine", &["DPYD"]),
    ("azathioprine", &["TPMT"]),
    ("mercaptopurine", &["TPMT"]),
];

/// Analyze medical history with the genetic findings already computed
pub fn analyze_medical_history(history: &MedicalHistory, findings: &[GeneticFinding]) -> Vec<Emission> {
    let mut emissions = Vec::new();

    for condition in &history.chronic_conditions {
        if let Some(emission) = chronic_condition(condition, findings) {
            emissions.push(emission);
        }
    }

    for (condition, relatives) in history.family_history.iter() {
        if let Some(emission) = family_condition(condition, relatives, findings) {
            emissions.push(emission);
        }
    }

    for medication in &history.medications {
        if let Some(emission) = medication_review(medication, findings) {
            emissions.push(emission);
        }
    }

    if history.medications.len() >= POLYPHARMACY_THRESHOLD {
        emissions.push(Emission::routine(format!(
            "Schedule a medication review with your pharmacist; you take {} medications",
            history.medications.len()
        )));
    }

    emissions
}

fn chronic_condition(condition: &str, findings: &[GeneticFinding]) -> Option<Emission> {
    let key = normalize(condition);
    let known = find_known(&key);
    let corroboration = corroborating_finding(&key, known, findings);

    let advice = match (known, corroboration) {
        (Some(known), _) => known.advice.to_string(),
        (None, Some(_)) => format!(
            "Coordinate care for {} with a specialist",
            humanize(&key)
        ),
        (None, None) => {
            debug!("Ignoring unknown condition '{}'", condition);
            return None;
        }
    };

    Some(escalate(advice, corroboration))
}

fn family_condition(condition: &str, relatives: &[String], findings: &[GeneticFinding]) -> Option<Emission> {
    let key = normalize(condition);
    let known = find_known(&key);
    let corroboration = corroborating_finding(&key, known, findings);

    if known.is_none() && corroboration.is_none() {
        debug!("Ignoring family history of unknown condition '{}'", condition);
        return None;
    }

    let advice = if relatives.is_empty() {
        format!(
            "Family history of {}: discuss an earlier or more frequent screening schedule",
            humanize(&key)
        )
    } else {
        format!(
            "Family history of {} ({}): discuss an earlier or more frequent screening schedule",
            humanize(&key),
            relatives.join(", ")
        )
    };

    Some(escalate(advice, corroboration))
}

fn medication_review(medication: &str, findings: &[GeneticFinding]) -> Option<Emission> {
    let name = medication.trim().to_lowercase();
    let (drug, genes) = DRUG_GENES.iter().find(|(drug, _)| name.starts_with(drug))?;

    let finding = findings
        .iter()
        .filter(|f| genes.iter().any(|g| f.gene.eq_ignore_ascii_case(g)))
        .max_by_key(|f| f.risk_level)?;

    Some(Emission::with_priority(
        format!(
            "Review {} with your prescriber; your {} result affects how it is processed",
            drug, finding.gene
        ),
        Priority::escalated_for(finding.risk_level),
    ))
}

fn escalate(advice: String, corroboration: Option<&GeneticFinding>) -> Emission {
    match corroboration {
        Some(finding) => Emission::with_priority(
            format!(
                "{}; your {} result indicates elevated inherited risk",
                advice, finding.gene
            ),
            Priority::escalated_for(finding.risk_level),
        ),
        None => Emission::routine(advice),
    }
}

fn find_known(key: &str) -> Option<&'static KnownCondition> {
    KNOWN_CONDITIONS
        .iter()
        .find(|k| k.names().any(|name| name == key))
}

/// Highest-risk finding sharing a condition with `key` (or its known aliases)
fn corroborating_finding<'a>(
    key: &str,
    known: Option<&KnownCondition>,
    findings: &'a [GeneticFinding],
) -> Option<&'a GeneticFinding> {
    let shares_condition = |condition: &str| {
        let condition = normalize(condition);
        condition == key || known.is_some_and(|k| k.names().any(|name| name == condition))
    };

    findings
        .iter()
        .filter(|f| f.conditions.iter().any(|c| shares_condition(c)))
        .max_by_key(|f| f.risk_level)
}

fn normalize(condition: &str) -> String {
    condition
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

fn humanize(key: &str) -> String {
    key.replace('_', " ")
}
