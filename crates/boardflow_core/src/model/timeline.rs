//! Per-appointment timeline and organization-wide governance log.
//!
//! # Invariants
//! - Both feeds are append-only and form a complete, time-ordered causal
//!   history; repair and activation flows add entries, never rewrite them.

use crate::model::appointment::AppointmentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit entry for one activation-saga step or lifecycle milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub uuid: Uuid,
    pub appointment_id: AppointmentId,
    pub event_type: String,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Cross-appointment audit feed entry, distinct from the per-appointment
/// timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceLogEntry {
    pub uuid: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub description: String,
    pub data: Option<serde_json::Value>,
    pub created_at: i64,
}

/// Timeline event types appended by the activation saga, in step order.
pub mod event_types {
    pub const ACTIVATION_STARTED: &str = "ACTIVATION_STARTED";
    pub const CERTIFICATE_GENERATED: &str = "CERTIFICATE_GENERATED";
    pub const LEDGER_UPDATED: &str = "LEDGER_UPDATED";
    pub const OFFICER_RECORD_CREATED: &str = "OFFICER_RECORD_CREATED";
    pub const ROLES_ASSIGNED: &str = "ROLES_ASSIGNED";
    pub const ACCESS_PROVISIONED: &str = "ACCESS_PROVISIONED";
    pub const EQUITY_ACTIVATED: &str = "EQUITY_ACTIVATED";
    pub const COMPENSATION_ADDED: &str = "COMPENSATION_ADDED";
    pub const BANKING_AUTHORITY_PREPARED: &str = "BANKING_AUTHORITY_PREPARED";
    pub const COMPLIANCE_ACTIVATED: &str = "COMPLIANCE_ACTIVATED";
    pub const OFFICER_ACTIVATED: &str = "OFFICER_ACTIVATED";
}
