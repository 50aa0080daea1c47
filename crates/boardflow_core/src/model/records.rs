//! Downstream activation records and sweep bookkeeping models.
//!
//! # Invariants
//! - Equity, compensation, banking-authority and compliance records are
//!   created at most once per appointment; repos check existence before
//!   every insert so repeated activation converges instead of conflicting.

use crate::model::appointment::AppointmentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an account in the external identity provider.
pub type IdentityId = Uuid;

/// Cap-table entry created by saga step 6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityEntry {
    pub uuid: Uuid,
    pub appointment_id: AppointmentId,
    pub holder_identity: IdentityId,
    pub shares_granted: f64,
    /// Vesting starts at the appointment's effective date.
    pub vesting_start: String,
    pub vesting_months: u32,
}

/// Compensation trigger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompensationTrigger {
    Active,
    Pending,
}

/// Compensation record created by saga step 7.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationEntry {
    pub uuid: Uuid,
    pub appointment_id: AppointmentId,
    pub identity_id: IdentityId,
    pub base_salary: f64,
    pub is_deferred: bool,
    pub trigger_status: CompensationTrigger,
    /// RFC 3339 timestamp; `None` while a deferred package is pending.
    pub activated_at: Option<String>,
}

/// Banking authority preparation state.
pub const BANKING_STATUS_PENDING_BANK_UPLOAD: &str = "PENDING_BANK_UPLOAD";

/// Banking authority record created by saga step 8.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankingAuthority {
    pub uuid: Uuid,
    pub appointment_id: AppointmentId,
    /// Directory record id from saga step 3.
    pub officer_id: Uuid,
    pub role: String,
    pub can_sign_wires: bool,
    pub can_sign_checks: bool,
    pub can_access_treasury_portal: bool,
    pub status: String,
    pub packet_ref: Option<String>,
}

/// Compliance record created by saga step 9.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    pub uuid: Uuid,
    pub appointment_id: AppointmentId,
    pub identity_id: IdentityId,
    pub nda_signed: bool,
    pub conflict_form_signed: bool,
    /// Presumed true; verification is delegated to the gating secretary
    /// review.
    pub identity_verified: bool,
    pub background_verified: bool,
    /// Manual toggle, defaults to false.
    pub insurance_coverage: bool,
}

/// Access account provisioned by saga step 5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessAccount {
    pub uuid: Uuid,
    pub identity_id: IdentityId,
    pub role: String,
    pub access_level: u32,
    pub title: String,
    pub department: String,
}

/// Onboarding checklist maintained by the trigger mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingChecklist {
    pub uuid: Uuid,
    pub appointment_id: AppointmentId,
    pub identity_id: Option<IdentityId>,
    pub status: String,
    /// Template ids the appointee must complete.
    pub documents_required: Vec<String>,
    pub documents_completed: Vec<String>,
}

/// Lightweight (identity, role titles) record resolved by the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub uuid: Uuid,
    pub identity_id: IdentityId,
    pub role_titles: Vec<String>,
    pub effective_date: String,
}
