// ==============================================================================
// markers.rs - Genetic Marker Knowledge Base
// ==============================================================================
// Description: Static gene -> conditions/risk factor table with CSV extensions
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
// Extension format: CSV file with header
//   gene,category,conditions,risk_factor,risk_alleles
//   BARD1,cancer,breast_cancer;ovarian_cancer,2.5,
//   G6PD,metabolic,g6pd_deficiency,2.0,A-;Mediterranean
// `conditions` and `risk_alleles` are ';'-separated. Rows override built-ins.
// ==============================================================================

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

use crate::error::KnowledgeBaseError;
use crate::models::{GeneticMarker, MarkerCategory};

/// A marker maps to either several conditions or one named condition
enum RawConditions {
    Many(&'static [&'static str]),
    One(&'static str),
}

impl RawConditions {
    fn normalize(&self) -> Vec<String> {
        match self {
            RawConditions::Many(list) => list.iter().map(|c| c.to_string()).collect(),
            RawConditions::One(condition) => vec![condition.to_string()],
        }
    }
}

struct RawMarker {
    gene: &'static str,
    category: MarkerCategory,
    conditions: RawConditions,
    risk_factor: f64,
    risk_alleles: &'static [&'static str],
}

use MarkerCategory::*;
use RawConditions::{Many, One};

const BUILTIN_MARKERS: &[RawMarker] = &[
    // Oncogenes / tumor suppressors
    RawMarker { gene: "BRCA1", category: Cancer, conditions: Many(&["breast_cancer", "ovarian_cancer"]), risk_factor: 5.0, risk_alleles: &["185delAG", "5382insC"] },
    RawMarker { gene: "BRCA2", category: Cancer, conditions: Many(&["breast_cancer", "ovarian_cancer", "prostate_cancer", "pancreatic_cancer"]), risk_factor: 4.5, risk_alleles: &["6174delT"] },
    RawMarker { gene: "TP53", category: Cancer, conditions: Many(&["breast_cancer", "sarcoma", "brain_cancer", "adrenocortical_carcinoma"]), risk_factor: 5.0, risk_alleles: &["R175H", "R248Q", "R273H"] },
    RawMarker { gene: "APC", category: Cancer, conditions: One("colorectal_cancer"), risk_factor: 4.0, risk_alleles: &["I1307K"] },
    RawMarker { gene: "MLH1", category: Cancer, conditions: Many(&["colorectal_cancer", "endometrial_cancer"]), risk_factor: 4.0, risk_alleles: &[] },
    RawMarker { gene: "MSH2", category: Cancer, conditions: Many(&["colorectal_cancer", "endometrial_cancer"]), risk_factor: 4.0, risk_alleles: &[] },
    RawMarker { gene: "PALB2", category: Cancer, conditions: Many(&["breast_cancer", "pancreatic_cancer"]), risk_factor: 3.5, risk_alleles: &[] },
    RawMarker { gene: "CHEK2", category: Cancer, conditions: Many(&["breast_cancer", "colorectal_cancer"]), risk_factor: 2.5, risk_alleles: &["1100delC", "I157T"] },
    // Cardiovascular
    RawMarker { gene: "LDLR", category: Cardiovascular, conditions: One("hypercholesterolemia"), risk_factor: 3.5, risk_alleles: &[] },
    RawMarker { gene: "APOB", category: Cardiovascular, conditions: One("hypercholesterolemia"), risk_factor: 3.0, risk_alleles: &["R3527Q"] },
    RawMarker { gene: "PCSK9", category: Cardiovascular, conditions: One("hypercholesterolemia"), risk_factor: 3.0, risk_alleles: &["D374Y"] },
    RawMarker { gene: "MYH7", category: Cardiovascular, conditions: One("hypertrophic_cardiomyopathy"), risk_factor: 3.5, risk_alleles: &[] },
    RawMarker { gene: "F5", category: Cardiovascular, conditions: One("venous_thrombosis"), risk_factor: 2.5, risk_alleles: &["R506Q", "leiden"] },
    // Neurodegenerative
    RawMarker { gene: "APOE", category: Neurodegenerative, conditions: One("alzheimers_disease"), risk_factor: 3.0, risk_alleles: &["e4", "ε4"] },
    RawMarker { gene: "PSEN1", category: Neurodegenerative, conditions: One("alzheimers_disease"), risk_factor: 5.0, risk_alleles: &[] },
    RawMarker { gene: "HTT", category: Neurodegenerative, conditions: One("huntingtons_disease"), risk_factor: 5.0, risk_alleles: &["cag_expansion", "expanded"] },
    RawMarker { gene: "LRRK2", category: Neurodegenerative, conditions: One("parkinsons_disease"), risk_factor: 2.5, risk_alleles: &["G2019S"] },
    RawMarker { gene: "SNCA", category: Neurodegenerative, conditions: One("parkinsons_disease"), risk_factor: 3.0, risk_alleles: &["A53T"] },
    // Metabolic
    RawMarker { gene: "TCF7L2", category: Metabolic, conditions: One("type2_diabetes"), risk_factor: 1.5, risk_alleles: &["rs7903146"] },
    RawMarker { gene: "FTO", category: Metabolic, conditions: One("obesity"), risk_factor: 1.3, risk_alleles: &["rs9939609"] },
    RawMarker { gene: "HFE", category: Metabolic, conditions: One("hemochromatosis"), risk_factor: 3.0, risk_alleles: &["C282Y", "H63D"] },
    RawMarker { gene: "MTHFR", category: Metabolic, conditions: One("hyperhomocysteinemia"), risk_factor: 1.2, risk_alleles: &["C677T", "A1298C"] },
    // Autoimmune
    RawMarker { gene: "HLA-B27", category: Autoimmune, conditions: Many(&["ankylosing_spondylitis", "reactive_arthritis", "uveitis"]), risk_factor: 3.0, risk_alleles: &[] },
    RawMarker { gene: "HLA-DQ2", category: Autoimmune, conditions: Many(&["celiac_disease", "type1_diabetes"]), risk_factor: 2.0, risk_alleles: &["DQ2.5"] },
    RawMarker { gene: "HLA-DRB1", category: Autoimmune, conditions: Many(&["rheumatoid_arthritis", "multiple_sclerosis"]), risk_factor: 2.0, risk_alleles: &["*04:01", "*15:01"] },
    RawMarker { gene: "PTPN22", category: Autoimmune, conditions: Many(&["rheumatoid_arthritis", "type1_diabetes", "lupus"]), risk_factor: 1.8, risk_alleles: &["R620W"] },
    // Pharmacogenetic
    RawMarker { gene: "CYP2C19", category: Pharmacogenetic, conditions: One("clopidogrel_response"), risk_factor: 2.0, risk_alleles: &["*2", "*3", "poor_metabolizer"] },
    RawMarker { gene: "CYP2D6", category: Pharmacogenetic, conditions: One("drug_metabolism"), risk_factor: 2.0, risk_alleles: &["*4", "*5", "poor_metabolizer", "ultrarapid"] },
    RawMarker { gene: "CYP2C9", category: Pharmacogenetic, conditions: One("warfarin_sensitivity"), risk_factor: 2.0, risk_alleles: &["*2", "*3"] },
    RawMarker { gene: "VKORC1", category: Pharmacogenetic, conditions: One("warfarin_sensitivity"), risk_factor: 2.0, risk_alleles: &["-1639G>A", "1639A"] },
    RawMarker { gene: "SLCO1B1", category: Pharmacogenetic, conditions: One("statin_myopathy"), risk_factor: 2.0, risk_alleles: &["*5", "521C"] },
    RawMarker { gene: "DPYD", category: Pharmacogenetic, conditions: One("fluoropyrimidine_toxicity"), risk_factor: 3.0, risk_alleles: &["*2A", "*13"] },
    RawMarker { gene: "TPMT", category: Pharmacogenetic, conditions: One("thiopurine_toxicity"), risk_factor: 2.5, risk_alleles: &["*2", "*3A", "*3C"] },
];

static BUILTIN: LazyLock<Arc<MarkerKnowledgeBase>> = LazyLock::new(|| {
    let markers = BUILTIN_MARKERS
        .iter()
        .map(|raw| GeneticMarker {
            gene: raw.gene.to_string(),
            category: raw.category,
            conditions: raw.conditions.normalize(),
            risk_factor: raw.risk_factor,
            risk_alleles: raw.risk_alleles.iter().map(|a| a.to_string()).collect(),
        });
    Arc::new(MarkerKnowledgeBase::from_markers(markers))
});

/// One row of a knowledge base extension file
#[derive(Debug, Deserialize)]
struct MarkerRow {
    gene: String,
    category: String,
    conditions: String,
    risk_factor: f64,
    #[serde(default)]
    risk_alleles: Option<String>,
}

/// Immutable gene -> marker lookup, shared across concurrent callers
#[derive(Debug, Clone)]
pub struct MarkerKnowledgeBase {
    /// Keyed by upper-cased gene identifier
    markers: HashMap<String, GeneticMarker>,
}

impl MarkerKnowledgeBase {
    fn from_markers(markers: impl IntoIterator<Item = GeneticMarker>) -> Self {
        let markers = markers
            .into_iter()
            .map(|m| (m.gene.to_uppercase(), m))
            .collect();
        Self { markers }
    }

    /// Process-wide built-in table, initialized on first use
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Built-in table extended (and overridden) by rows from a CSV file
    pub fn with_extensions(path: impl AsRef<Path>) -> Result<Self, KnowledgeBaseError> {
        let file = std::fs::File::open(path.as_ref())?;
        let kb = Self::with_extensions_from_reader(file)?;
        info!(
            "Loaded marker knowledge base: {} markers (extensions from {:?})",
            kb.len(),
            path.as_ref()
        );
        Ok(kb)
    }

    /// Same as [`with_extensions`](Self::with_extensions) over any reader
    pub fn with_extensions_from_reader<R: Read>(reader: R) -> Result<Self, KnowledgeBaseError> {
        let mut kb = BUILTIN.as_ref().clone();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        for row in reader.deserialize::<MarkerRow>() {
            let marker = Self::marker_from_row(row?)?;
            debug!("Extension marker: {} ({:?})", marker.gene, marker.category);
            kb.markers.insert(marker.gene.to_uppercase(), marker);
        }

        Ok(kb)
    }

    fn marker_from_row(row: MarkerRow) -> Result<GeneticMarker, KnowledgeBaseError> {
        if row.gene.is_empty() {
            return Err(KnowledgeBaseError::EmptyGene);
        }

        if !row.risk_factor.is_finite() || row.risk_factor <= 0.0 {
            return Err(KnowledgeBaseError::InvalidRiskFactor {
                gene: row.gene,
                value: row.risk_factor,
            });
        }

        let conditions = split_list(&row.conditions);
        if conditions.is_empty() {
            return Err(KnowledgeBaseError::MissingConditions { gene: row.gene });
        }

        Ok(GeneticMarker {
            category: MarkerCategory::parse(&row.category),
            conditions,
            risk_factor: row.risk_factor,
            risk_alleles: row.risk_alleles.as_deref().map(split_list).unwrap_or_default(),
            gene: row.gene,
        })
    }

    /// Case-insensitive marker lookup; unknown genes return `None`
    pub fn lookup(&self, gene: &str) -> Option<&GeneticMarker> {
        self.markers.get(&gene.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_lookup_multi_condition_marker() {
        let kb = MarkerKnowledgeBase::builtin();
        let brca1 = kb.lookup("BRCA1").unwrap();

        assert_eq!(brca1.category, MarkerCategory::Cancer);
        assert_eq!(brca1.conditions, vec!["breast_cancer", "ovarian_cancer"]);
        assert_eq!(brca1.risk_factor, 5.0);
    }

    #[test]
    fn test_single_condition_normalized_to_list() {
        let kb = MarkerKnowledgeBase::builtin();
        let apoe = kb.lookup("APOE").unwrap();
        assert_eq!(apoe.conditions, vec!["alzheimers_disease"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let kb = MarkerKnowledgeBase::builtin();
        assert!(kb.lookup("brca2").is_some());
        assert!(kb.lookup(" hla-b27 ").is_some());
        assert!(kb.lookup("UNKNOWN_GENE").is_none());
    }

    #[test]
    fn test_builtin_covers_every_category() {
        let kb = MarkerKnowledgeBase::builtin();
        for (gene, category) in [
            ("TP53", MarkerCategory::Cancer),
            ("LDLR", MarkerCategory::Cardiovascular),
            ("HTT", MarkerCategory::Neurodegenerative),
            ("HFE", MarkerCategory::Metabolic),
            ("PTPN22", MarkerCategory::Autoimmune),
            ("CYP2C19", MarkerCategory::Pharmacogenetic),
        ] {
            assert_eq!(kb.lookup(gene).unwrap().category, category, "{}", gene);
        }
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = MarkerKnowledgeBase::builtin();
        let b = MarkerKnowledgeBase::builtin();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_extensions_add_and_override() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "gene,category,conditions,risk_factor,risk_alleles").unwrap();
        writeln!(temp_file, "BARD1,cancer,breast_cancer;ovarian_cancer,2.5,").unwrap();
        writeln!(temp_file, "FTO,metabolic,obesity,2.2,rs9939609").unwrap();
        writeln!(temp_file, "XYZ1,dermatological,psoriasis,1.1,").unwrap();
        temp_file.flush().unwrap();

        let kb = MarkerKnowledgeBase::with_extensions(temp_file.path()).unwrap();

        let bard1 = kb.lookup("BARD1").unwrap();
        assert_eq!(bard1.conditions, vec!["breast_cancer", "ovarian_cancer"]);
        assert!(bard1.risk_alleles.is_empty());

        assert_eq!(kb.lookup("FTO").unwrap().risk_factor, 2.2);
        assert_eq!(kb.lookup("XYZ1").unwrap().category, MarkerCategory::Other);
        assert_eq!(kb.len(), MarkerKnowledgeBase::builtin().len() + 2);

        // Built-in table is untouched
        assert_eq!(MarkerKnowledgeBase::builtin().lookup("FTO").unwrap().risk_factor, 1.3);
    }

    #[test]
    fn test_extension_rejects_bad_risk_factor() {
        let csv = "gene,category,conditions,risk_factor,risk_alleles\nBAD1,cancer,x,-1.0,\n";
        let err = MarkerKnowledgeBase::with_extensions_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::InvalidRiskFactor { .. }));
    }

    #[test]
    fn test_extension_rejects_missing_conditions() {
        let csv = "gene,category,conditions,risk_factor,risk_alleles\nBAD2,cancer, ; ,2.0,\n";
        let err = MarkerKnowledgeBase::with_extensions_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::MissingConditions { .. }));
    }
}
