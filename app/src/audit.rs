// ==============================================================================
// audit.rs - Audit Logging for Recommendation Requests
// ==============================================================================
// Description: Structured audit trail for every analysis request
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 1.0.0
// Compliance: HIPAA § 164.312(b) (no health values are written to the trail)
// ==============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const AUDIT_TARGET: &str = "audit";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    KnowledgeBaseLoaded,
    AnalysisStarted,
    AnalysisCompleted,
    InputRejected,
    BatchCompleted,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub request_id: Option<Uuid>,
    pub details: serde_json::Value,
    pub severity: LogSeverity,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, request_id: Option<Uuid>, details: serde_json::Value) -> Self {
        let severity = match event_type {
            AuditEventType::InputRejected => LogSeverity::Warning,
            _ => LogSeverity::Info,
        };

        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type,
            request_id,
            details,
            severity,
        }
    }

    /// Emit the event on the `audit` tracing target
    pub fn emit(&self) {
        let payload = match serde_json::to_string(self) {
            Ok(payload) => payload,
            Err(e) => {
                error!(target: AUDIT_TARGET, "Failed to serialize audit event {}: {}", self.id, e);
                return;
            }
        };

        match self.severity {
            LogSeverity::Info => info!(target: AUDIT_TARGET, "{}", payload),
            LogSeverity::Warning => warn!(target: AUDIT_TARGET, "{}", payload),
            LogSeverity::Error => error!(target: AUDIT_TARGET, "{}", payload),
        }
    }
}

/// Convenience function to emit an audit event
pub fn log_event(event_type: AuditEventType, request_id: Option<Uuid>, details: serde_json::Value) {
    AuditEvent::new(event_type, request_id, details).emit();
}
