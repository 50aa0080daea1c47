//! Appointment domain model.
//!
//! # Responsibility
//! - Define the canonical executive appointment record.
//! - Validate invariants that must hold before persistence.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another appointment.
//! - The proposed title set is never empty.
//! - Appointments are never deleted; later office events append new ledger
//!   entries instead of rewriting this record.

use crate::model::status::AppointmentStatus;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an appointment.
pub type AppointmentId = Uuid;

/// Stable identifier for a board resolution.
pub type ResolutionId = Uuid;

/// Validation failures raised before an appointment write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentValidationError {
    EmptyTitleSet,
    BlankAppointeeName,
}

impl Display for AppointmentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitleSet => write!(f, "appointment must propose at least one title"),
            Self::BlankAppointeeName => write!(f, "appointee name cannot be blank"),
        }
    }
}

impl Error for AppointmentValidationError {}

/// A proposal placing an individual into one or more officer roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub uuid: AppointmentId,
    pub appointee_name: String,
    /// Identity reference; resolved against the identity provider by email.
    pub appointee_email: Option<String>,
    /// Proposed officer title(s); must stay non-empty.
    pub role_titles: Vec<String>,
    /// ISO-8601 calendar date (YYYY-MM-DD).
    pub effective_date: String,
    pub term_length_months: Option<u32>,
    pub status: AppointmentStatus,
    pub resolution_id: Option<ResolutionId>,
    pub equity_included: bool,
    /// Free-text equity description, e.g. "500,000 shares, 4-year vest".
    pub equity_details: Option<String>,
    /// Free-text compensation description, e.g. "$180,000 deferred".
    pub compensation_structure: Option<String>,
    pub formation_mode: bool,
    /// Object-store reference to the generated certificate, once produced.
    pub certificate_ref: Option<String>,
    /// RFC 3339 timestamp set by the saga's finalize step.
    pub activation_date: Option<String>,
}

impl Appointment {
    /// Creates a draft appointment with a generated stable ID.
    pub fn new(
        appointee_name: impl Into<String>,
        role_titles: Vec<String>,
        effective_date: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            appointee_name: appointee_name.into(),
            appointee_email: None,
            role_titles,
            effective_date: effective_date.into(),
            term_length_months: None,
            status: AppointmentStatus::Draft,
            resolution_id: None,
            equity_included: false,
            equity_details: None,
            compensation_structure: None,
            formation_mode: false,
            certificate_ref: None,
            activation_date: None,
        }
    }

    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), AppointmentValidationError> {
        if self.role_titles.is_empty() || self.role_titles.iter().all(|t| t.trim().is_empty()) {
            return Err(AppointmentValidationError::EmptyTitleSet);
        }
        if self.appointee_name.trim().is_empty() {
            return Err(AppointmentValidationError::BlankAppointeeName);
        }
        Ok(())
    }

    /// Joined display form of the proposed titles, e.g. "CEO, Treasurer".
    pub fn joined_titles(&self) -> String {
        self.role_titles.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::{Appointment, AppointmentValidationError};

    #[test]
    fn empty_title_set_is_rejected() {
        let appointment = Appointment::new("Dana Whitfield", vec![], "2025-01-01");
        assert_eq!(
            appointment.validate(),
            Err(AppointmentValidationError::EmptyTitleSet)
        );
    }

    #[test]
    fn whitespace_only_titles_are_rejected() {
        let appointment = Appointment::new("Dana Whitfield", vec!["  ".to_string()], "2025-01-01");
        assert_eq!(
            appointment.validate(),
            Err(AppointmentValidationError::EmptyTitleSet)
        );
    }

    #[test]
    fn valid_appointment_passes() {
        let appointment =
            Appointment::new("Dana Whitfield", vec!["CEO".to_string()], "2025-01-01");
        assert!(appointment.validate().is_ok());
        assert_eq!(appointment.joined_titles(), "CEO");
    }
}
