// ==============================================================================
// models.rs - Recommendation Engine Data Models
// ==============================================================================
// Description: Input payloads, genetic findings and categorized output types
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ==============================================================================
// RISK AND CATEGORY ENUMS
// ==============================================================================

/// Discretized risk bucket, ordered low < moderate < high < very_high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very_high",
        }
    }
}

/// Output bucket used to prioritize recommendations for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Critical,
    HighPriority,
    Preventive,
    Lifestyle,
    Genetic,
    Monitoring,
}

impl Category {
    /// All categories in output order
    pub const ALL: [Category; 6] = [
        Category::Critical,
        Category::HighPriority,
        Category::Preventive,
        Category::Lifestyle,
        Category::Genetic,
        Category::Monitoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Critical => "critical",
            Category::HighPriority => "high_priority",
            Category::Preventive => "preventive",
            Category::Lifestyle => "lifestyle",
            Category::Genetic => "genetic",
            Category::Monitoring => "monitoring",
        }
    }
}

/// Condition family a marker belongs to; drives advice templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerCategory {
    Cancer,
    Cardiovascular,
    Neurodegenerative,
    Metabolic,
    Autoimmune,
    Pharmacogenetic,
    /// Markers loaded from extension files with an unrecognized category
    Other,
}

impl MarkerCategory {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "cancer" | "oncogene" => MarkerCategory::Cancer,
            "cardiovascular" => MarkerCategory::Cardiovascular,
            "neurodegenerative" => MarkerCategory::Neurodegenerative,
            "metabolic" => MarkerCategory::Metabolic,
            "autoimmune" => MarkerCategory::Autoimmune,
            "pharmacogenetic" | "pharmacogenomic" => MarkerCategory::Pharmacogenetic,
            _ => MarkerCategory::Other,
        }
    }
}

/// Analyzer that produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    Genetic,
    Lifestyle,
    MedicalHistory,
    Environmental,
    HealthMetrics,
}

/// Urgency attached by an analyzer to a single recommendation.
///
/// Only medical history and health metrics output uses anything other than
/// `Routine`; the aggregator turns it into a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Routine,
    Elevated,
    Critical,
}

impl Priority {
    /// Escalation level warranted by a corroborating genetic finding
    pub fn escalated_for(level: RiskLevel) -> Self {
        if level == RiskLevel::VeryHigh {
            Priority::Critical
        } else {
            Priority::Elevated
        }
    }
}

/// Recommendation text emitted by an analyzer, before categorization
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub text: String,
    pub priority: Priority,
}

impl Emission {
    pub fn routine(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: Priority::Routine,
        }
    }

    pub fn with_priority(text: impl Into<String>, priority: Priority) -> Self {
        Self {
            text: text.into(),
            priority,
        }
    }
}

// ==============================================================================
// GENETICS
// ==============================================================================

/// Knowledge base entry for a genetic marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneticMarker {
    /// Gene identifier (e.g., "BRCA1")
    pub gene: String,

    pub category: MarkerCategory,

    /// Associated conditions, always normalized to a list
    pub conditions: Vec<String>,

    /// Relative risk contribution (conventionally 1.0-5.0)
    pub risk_factor: f64,

    /// Gene-specific allele names counted as risk variants (e.g., "e4", "C282Y")
    pub risk_alleles: Vec<String>,
}

/// Per-analysis result for a marker with a pathogenic variant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneticFinding {
    pub gene: String,
    pub variant: Option<String>,
    pub category: MarkerCategory,
    pub risk_factor: f64,
    pub risk_level: RiskLevel,
    pub conditions: Vec<String>,
    pub recommendations: Vec<String>,
}

// ==============================================================================
// INPUT PAYLOADS
// ==============================================================================

/// Insertion-ordered string-keyed mapping
///
/// Serializes as a JSON object with keys in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.entries.push((key.into(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Observed genotype for one gene
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneticEntry {
    pub variant: Option<String>,
}

impl GeneticEntry {
    pub fn variant(variant: impl Into<String>) -> Self {
        Self {
            variant: Some(variant.into()),
        }
    }
}

/// gene identifier -> observed variant, in document order
pub type GeneticData = OrderedMap<GeneticEntry>;

/// Lifestyle habits; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LifestyleData {
    pub smoking: Option<bool>,

    /// Minutes of moderate activity per week
    pub exercise: Option<f64>,

    /// Categorical diet description (e.g., "balanced", "unhealthy")
    pub diet: Option<String>,

    /// Average hours of sleep per night
    pub sleep_hours: Option<f64>,

    pub sleep_quality: Option<String>,

    /// Self-reported stress on a 1-10 scale
    pub stress_level: Option<f64>,

    pub alcohol_units_per_week: Option<f64>,

    pub substance_use: Option<bool>,
}

/// Medical history; conditions are free-form keywords
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MedicalHistory {
    pub chronic_conditions: Vec<String>,
    pub medications: Vec<String>,

    /// condition -> affected relatives
    pub family_history: OrderedMap<Vec<String>>,
}

/// Environmental exposure snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentalData {
    /// Air quality index (US AQI)
    pub air_quality: Option<f64>,
    pub uv_index: Option<f64>,

    /// Ambient noise in dB
    pub noise_level: Option<f64>,

    /// Degrees Celsius
    pub ambient_temperature: Option<f64>,

    /// Relative humidity in percent
    pub humidity: Option<f64>,

    /// Known hazardous exposures (e.g., "radon", "asbestos")
    pub exposures: Vec<String>,
}

/// Single reading of a health metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReading {
    pub value: f64,
    pub timestamp: Option<NaiveDateTime>,
}

impl MetricReading {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            timestamp: None,
        }
    }

    pub fn at(value: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            value,
            timestamp: Some(timestamp),
        }
    }
}

/// metric name -> readings
pub type HealthMetrics = OrderedMap<Vec<MetricReading>>;

/// Everything the engine knows about one person; any domain may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genetic_data: Option<GeneticData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifestyle_data: Option<LifestyleData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<MedicalHistory>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environmental_data: Option<EnvironmentalData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_metrics: Option<HealthMetrics>,
}

// ==============================================================================
// OUTPUT
// ==============================================================================

/// Categorized recommendation text; all six categories are always present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub critical: Vec<String>,
    pub high_priority: Vec<String>,
    pub preventive: Vec<String>,
    pub lifestyle: Vec<String>,
    pub genetic: Vec<String>,
    pub monitoring: Vec<String>,
}

impl RecommendationSet {
    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Critical => &self.critical,
            Category::HighPriority => &self.high_priority,
            Category::Preventive => &self.preventive,
            Category::Lifestyle => &self.lifestyle,
            Category::Genetic => &self.genetic,
            Category::Monitoring => &self.monitoring,
        }
    }

    pub(crate) fn bucket_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Critical => &mut self.critical,
            Category::HighPriority => &mut self.high_priority,
            Category::Preventive => &mut self.preventive,
            Category::Lifestyle => &mut self.lifestyle,
            Category::Genetic => &mut self.genetic,
            Category::Monitoring => &mut self.monitoring,
        }
    }

    /// Categories in output order with their recommendations
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Total number of recommendations across all categories
    pub fn len(&self) -> usize {
        self.iter().map(|(_, recs)| recs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Recommendation with its category and generating analyzer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRecord {
    pub text: String,
    pub category: Category,
    pub source: AnalyzerKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::Moderate < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::VeryHigh.as_str(), "very_high");
    }

    #[test]
    fn test_empty_set_serializes_all_categories() {
        let json = serde_json::to_string(&RecommendationSet::default()).unwrap();
        assert_eq!(
            json,
            r#"{"critical":[],"high_priority":[],"preventive":[],"lifestyle":[],"genetic":[],"monitoring":[]}"#
        );
    }

    #[test]
    fn test_ordered_map_serializes_in_insertion_order() {
        let mut data = GeneticData::new();
        data.insert("TP53", GeneticEntry::variant("pathogenic"));
        data.insert("APOE", GeneticEntry::variant("e3/e4"));

        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(
            json,
            r#"{"TP53":{"variant":"pathogenic"},"APOE":{"variant":"e3/e4"}}"#
        );
    }

    #[test]
    fn test_marker_category_parse() {
        assert_eq!(MarkerCategory::parse("Oncogene"), MarkerCategory::Cancer);
        assert_eq!(MarkerCategory::parse(" metabolic "), MarkerCategory::Metabolic);
        assert_eq!(MarkerCategory::parse("dermatological"), MarkerCategory::Other);
    }

    #[test]
    fn test_escalation_priority() {
        assert_eq!(Priority::escalated_for(RiskLevel::VeryHigh), Priority::Critical);
        assert_eq!(Priority::escalated_for(RiskLevel::High), Priority::Elevated);
        assert_eq!(Priority::escalated_for(RiskLevel::Low), Priority::Elevated);
    }
}
