// ==============================================================================
// analyzers/mod.rs - Domain Analyzers
// ==============================================================================
// Description: Pure per-domain functions turning input payloads into advice
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// ==============================================================================

pub mod genetic;
pub mod lifestyle;
pub mod medical;
pub mod environmental;
pub mod metrics;

pub use genetic::analyze_genetic;
pub use lifestyle::analyze_lifestyle;
pub use medical::analyze_medical_history;
pub use environmental::analyze_environmental;
pub use metrics::analyze_health_metrics;
