// ==============================================================================
// lib.rs - Health Recommender Library
// ==============================================================================
// Description: Library interface for the health risk recommendation engine
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

pub mod analyzers;
pub mod audit;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod markers;
pub mod models;
pub mod report;
pub mod validator;

pub use classifier::{classify_risk, genetic_advice, variant_is_pathogenic, RiskFeatures, RiskScorer};
pub use engine::{categorize, generate_recommendations, Analysis, EngineConfig, RecommendationEngine};
pub use error::{EngineError, KnowledgeBaseError, ValidationError};
pub use markers::MarkerKnowledgeBase;
pub use models::{
    AggregateInput, Category, GeneticFinding, GeneticMarker, RecommendationSet, RiskLevel,
};
pub use report::{OutputFormat, RecommendationReport};
pub use validator::InputValidator;
