//! Officer ledger and directory models.
//!
//! # Responsibility
//! - `LedgerEntry`: append-only historical record of office-holding, the
//!   audit source of truth.
//! - `DirectoryRecord`: mutable current-state projection derived from the
//!   ledger, one row per (email, title).
//!
//! # Invariants
//! - Ledger entries are never mutated or deleted; at most one entry is
//!   created per successful saga run for a given appointment.
//! - A directory record always reflects the latest ledger entry for its
//!   (email, title) pair.

use crate::model::appointment::{AppointmentId, ResolutionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Office-holding state recorded on ledger entries and directory rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfficerStatus {
    Active,
    Resigned,
    Removed,
    Expired,
}

/// Append-only ledger record for one office-holding event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub uuid: Uuid,
    pub appointment_id: AppointmentId,
    pub name: String,
    pub title: String,
    pub effective_date: String,
    pub certificate_ref: Option<String>,
    pub resolution_id: Option<ResolutionId>,
    pub resolution_number: Option<String>,
    /// Status at creation time; later events append new entries instead.
    pub status: OfficerStatus,
}

/// Mutable current-state directory row, keyed by (email, title).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub uuid: Uuid,
    pub name: String,
    pub email: String,
    pub title: String,
    pub effective_date: String,
    pub certificate_ref: Option<String>,
    /// Resolution that authorized the current state, when known.
    pub appointed_by: Option<ResolutionId>,
    pub status: OfficerStatus,
}
