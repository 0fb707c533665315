// ==============================================================================
// engine.rs - Recommendation Aggregator / Categorizer
// ==============================================================================
// Description: Runs domain analyzers in dependency order and buckets their
//              output into the six recommendation categories
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================
// Evaluation order (fixed):
//   genetic → lifestyle → medical history (+ genetic findings) → environmental
//   → health metrics
// Categorization:
//   genetic        → genetic
//   lifestyle      → lifestyle
//   environmental  → preventive
//   medical/metric → critical | high_priority | monitoring (by priority)
// ==============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analyzers::{
    analyze_environmental, analyze_genetic, analyze_health_metrics, analyze_lifestyle,
    analyze_medical_history,
};
use crate::analyzers::lifestyle::DEFAULT_EXERCISE_TARGET_MINUTES;
use crate::classifier::RiskScorer;
use crate::error::ValidationError;
use crate::markers::MarkerKnowledgeBase;
use crate::models::{
    AggregateInput, AnalyzerKind, Category, Emission, GeneticFinding, Priority,
    RecommendationRecord, RecommendationSet, RiskLevel,
};
use crate::validator::InputValidator;

/// Engine limits and policy switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_genetic_entries: usize,
    pub max_lifestyle_keys: usize,

    /// Applies to conditions, medications, family history and exposures
    pub max_list_entries: usize,

    /// Total readings across all health metrics
    pub max_metric_readings: usize,

    pub exercise_target_minutes: f64,

    /// Drop repeated text within a category (first occurrence kept)
    pub deduplicate: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_genetic_entries: 1000,
            max_lifestyle_keys: 64,
            max_list_entries: 256,
            max_metric_readings: 10_000,
            exercise_target_minutes: DEFAULT_EXERCISE_TARGET_MINUTES,
            deduplicate: false,
        }
    }
}

/// Full result of one analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub recommendations: RecommendationSet,

    /// Every recommendation with its category and source, in append order
    pub records: Vec<RecommendationRecord>,

    pub genetic_findings: Vec<GeneticFinding>,

    /// Highest risk level among genetic findings
    pub overall_genetic_risk: Option<RiskLevel>,
}

/// Stateless recommendation engine; safe to share across threads
#[derive(Clone)]
pub struct RecommendationEngine {
    knowledge_base: Arc<MarkerKnowledgeBase>,
    config: EngineConfig,
    validator: InputValidator,
    scorer: Option<Arc<dyn RiskScorer>>,
}

impl RecommendationEngine {
    /// Engine over the built-in knowledge base with default limits
    pub fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            knowledge_base: MarkerKnowledgeBase::builtin(),
            validator: InputValidator::new(&config),
            config,
            scorer: None,
        }
    }

    pub fn with_knowledge_base(mut self, knowledge_base: Arc<MarkerKnowledgeBase>) -> Self {
        self.knowledge_base = knowledge_base;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.validator = InputValidator::new(&config);
        self.config = config;
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn RiskScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn knowledge_base(&self) -> &MarkerKnowledgeBase {
        &self.knowledge_base
    }

    /// Single entry point: categorized recommendations for one person
    pub fn generate_recommendations(&self, input: &AggregateInput) -> Result<RecommendationSet, ValidationError> {
        self.analyze(input).map(|analysis| analysis.recommendations)
    }

    /// Convert a raw JSON document into typed input using this engine's limits
    pub fn parse_input(&self, value: &Value) -> Result<AggregateInput, ValidationError> {
        self.validator.parse(value)
    }

    /// Validate a raw JSON document with this engine's limits and analyze it
    pub fn analyze_json(&self, value: &Value) -> Result<Analysis, ValidationError> {
        let input = self.validator.parse(value)?;
        Ok(self.run(&input))
    }

    /// Validate typed input, then run every analyzer
    pub fn analyze(&self, input: &AggregateInput) -> Result<Analysis, ValidationError> {
        self.validator.check(input)?;
        Ok(self.run(input))
    }

    fn run(&self, input: &AggregateInput) -> Analysis {
        let mut aggregator = Aggregator::new(self.config.deduplicate);

        let genetic_findings = input
            .genetic_data
            .as_ref()
            .map(|data| analyze_genetic(&self.knowledge_base, data, self.scorer.as_deref()))
            .unwrap_or_default();
        for finding in &genetic_findings {
            for text in &finding.recommendations {
                aggregator.push(AnalyzerKind::Genetic, Emission::routine(text.clone()));
            }
        }

        if let Some(lifestyle) = &input.lifestyle_data {
            aggregator.extend(
                AnalyzerKind::Lifestyle,
                analyze_lifestyle(lifestyle, self.config.exercise_target_minutes),
            );
        }

        if let Some(history) = &input.medical_history {
            aggregator.extend(
                AnalyzerKind::MedicalHistory,
                analyze_medical_history(history, &genetic_findings),
            );
        }

        if let Some(environment) = &input.environmental_data {
            aggregator.extend(AnalyzerKind::Environmental, analyze_environmental(environment));
        }

        if let Some(metrics) = &input.health_metrics {
            aggregator.extend(AnalyzerKind::HealthMetrics, analyze_health_metrics(metrics));
        }

        let overall_genetic_risk = genetic_findings.iter().map(|f| f.risk_level).max();
        let (recommendations, records) = aggregator.finish();

        info!(
            "Generated {} recommendations from {} genetic findings (critical: {}, high_priority: {}, preventive: {}, lifestyle: {}, genetic: {}, monitoring: {})",
            records.len(),
            genetic_findings.len(),
            recommendations.critical.len(),
            recommendations.high_priority.len(),
            recommendations.preventive.len(),
            recommendations.lifestyle.len(),
            recommendations.genetic.len(),
            recommendations.monitoring.len(),
        );

        Analysis {
            recommendations,
            records,
            genetic_findings,
            overall_genetic_risk,
        }
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Sole writer of the recommendation set
struct Aggregator {
    deduplicate: bool,
    set: RecommendationSet,
    records: Vec<RecommendationRecord>,
}

impl Aggregator {
    fn new(deduplicate: bool) -> Self {
        Self {
            deduplicate,
            set: RecommendationSet::default(),
            records: Vec::new(),
        }
    }

    fn extend(&mut self, source: AnalyzerKind, emissions: Vec<Emission>) {
        for emission in emissions {
            self.push(source, emission);
        }
    }

    fn push(&mut self, source: AnalyzerKind, emission: Emission) {
        let category = categorize(source, emission.priority);
        let bucket = self.set.bucket_mut(category);

        if self.deduplicate && bucket.contains(&emission.text) {
            debug!("Dropping duplicate {} recommendation", category.as_str());
            return;
        }

        bucket.push(emission.text.clone());
        self.records.push(RecommendationRecord {
            text: emission.text,
            category,
            source,
        });
    }

    fn finish(self) -> (RecommendationSet, Vec<RecommendationRecord>) {
        (self.set, self.records)
    }
}

/// Category for an analyzer's emission
pub fn categorize(source: AnalyzerKind, priority: Priority) -> Category {
    match source {
        AnalyzerKind::Genetic => Category::Genetic,
        AnalyzerKind::Lifestyle => Category::Lifestyle,
        AnalyzerKind::Environmental => Category::Preventive,
        AnalyzerKind::MedicalHistory | AnalyzerKind::HealthMetrics => match priority {
            Priority::Critical => Category::Critical,
            Priority::Elevated => Category::HighPriority,
            Priority::Routine => Category::Monitoring,
        },
    }
}

/// Categorized recommendations using the built-in knowledge base and defaults
pub fn generate_recommendations(input: &AggregateInput) -> Result<RecommendationSet, ValidationError> {
    RecommendationEngine::new().generate_recommendations(input)
}
