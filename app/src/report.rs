// ==============================================================================
// report.rs - Recommendation Report Output
// ==============================================================================
// Description: Report envelope and JSON/text rendering for recommendation results
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

use crate::engine::{Analysis, RecommendationEngine};
use crate::error::{EngineError, ValidationError};
use crate::models::{AggregateInput, GeneticFinding, RecommendationSet, RiskLevel};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON (best for web APIs and downstream services)
    Json,
    /// Plain text (best for terminals)
    Text,
}

impl OutputFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }

    /// Get MIME type for HTTP delivery
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Text => "text/plain",
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// SHA-256 of the compact serialized input
    pub input_sha256: String,
    pub engine_version: String,
}

/// Complete recommendation report for one person
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    #[serde(flatten)]
    pub metadata: ReportMetadata,
    pub overall_genetic_risk: Option<RiskLevel>,
    pub genetic_findings: Vec<GeneticFinding>,
    pub recommendations: RecommendationSet,
}

impl RecommendationReport {
    pub fn new(request_id: Uuid, input: &AggregateInput, analysis: Analysis) -> Result<Self, serde_json::Error> {
        Ok(Self {
            metadata: ReportMetadata {
                request_id,
                generated_at: Utc::now(),
                input_sha256: input_fingerprint(input)?,
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            overall_genetic_risk: analysis.overall_genetic_risk,
            genetic_findings: analysis.genetic_findings,
            recommendations: analysis.recommendations,
        })
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self),
            OutputFormat::Text => Ok(self.to_string()),
        }
    }
}

/// Plain-text rendering
impl fmt::Display for RecommendationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request: {}", self.metadata.request_id)?;
        writeln!(
            f,
            "Overall genetic risk: {}",
            self.overall_genetic_risk.map(|r| r.as_str()).unwrap_or("none")
        )?;

        if !self.genetic_findings.is_empty() {
            writeln!(f, "\nGenetic findings:")?;
            for finding in &self.genetic_findings {
                writeln!(
                    f,
                    "  {} ({}): {} [{}]",
                    finding.gene,
                    finding.variant.as_deref().unwrap_or("-"),
                    finding.conditions.join(", "),
                    finding.risk_level.as_str()
                )?;
            }
        }

        for (category, recommendations) in self.recommendations.iter() {
            if recommendations.is_empty() {
                continue;
            }
            writeln!(f, "\n[{}]", category.as_str())?;
            for (i, text) in recommendations.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, text)?;
            }
        }

        Ok(())
    }
}

/// Validate, analyze and wrap one raw JSON document
pub fn build_report(
    engine: &RecommendationEngine,
    request_id: Uuid,
    value: &serde_json::Value,
) -> Result<RecommendationReport, EngineError> {
    let input = engine.parse_input(value)?;
    let analysis = engine.analyze(&input)?;
    Ok(RecommendationReport::new(request_id, &input, analysis)?)
}

/// SHA-256 of the compact JSON serialization of the input
pub fn input_fingerprint(input: &AggregateInput) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(input)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// One line of batch output: a report or the validation error that rejected it
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RecommendationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BatchError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    pub field: String,
    pub message: String,
}

impl BatchEntry {
    pub fn success(line: usize, report: RecommendationReport) -> Self {
        Self {
            line,
            report: Some(report),
            error: None,
        }
    }

    pub fn failure(line: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line,
            report: None,
            error: Some(BatchError {
                field: field.into(),
                message: message.into(),
            }),
        }
    }

    pub fn rejected(line: usize, err: &ValidationError) -> Self {
        Self::failure(line, err.field(), err.to_string())
    }

    pub fn from_result(line: usize, result: Result<RecommendationReport, EngineError>) -> Self {
        match result {
            Ok(report) => Self::success(line, report),
            Err(EngineError::Validation(e)) => Self::rejected(line, &e),
            Err(e) => Self::failure(line, "", e.to_string()),
        }
    }
}
