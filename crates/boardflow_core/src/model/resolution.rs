//! Board resolution domain model.
//!
//! # Invariants
//! - `resolution_number` follows `{year}-{4-digit sequence}` and is unique.
//! - Status only moves PENDING_VOTE -> ADOPTED | REJECTED, driven by the
//!   board voting surface outside this crate.

use crate::model::appointment::{AppointmentId, ResolutionId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Resolution voting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStatus {
    PendingVote,
    Adopted,
    Rejected,
}

/// A board resolution, usually adopted to authorize an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardResolution {
    pub uuid: ResolutionId,
    /// Human-readable `{year}-{sequence}` number, e.g. "2025-0007".
    pub resolution_number: String,
    pub title: String,
    pub description: String,
    pub resolution_type: String,
    pub status: ResolutionStatus,
    pub meeting_date: Option<String>,
    pub effective_date: Option<String>,
    /// JSON metadata; carries the appointment link and proposed titles.
    pub metadata: Option<serde_json::Value>,
}

pub const RESOLUTION_TYPE_EXECUTIVE_APPOINTMENT: &str = "EXECUTIVE_APPOINTMENT";

impl BoardResolution {
    /// Creates a pending-vote appointment resolution linked back to its
    /// appointment.
    pub fn for_appointment(
        resolution_number: impl Into<String>,
        appointment_id: AppointmentId,
        appointee_name: &str,
        titles: &[String],
        effective_date: &str,
    ) -> Self {
        let joined = titles.join(", ");
        Self {
            uuid: Uuid::new_v4(),
            resolution_number: resolution_number.into(),
            title: format!("Appointment of {appointee_name} as {joined}"),
            description: format!(
                "Board resolution to appoint {appointee_name} to the position of {joined}"
            ),
            resolution_type: RESOLUTION_TYPE_EXECUTIVE_APPOINTMENT.to_string(),
            status: ResolutionStatus::PendingVote,
            meeting_date: None,
            effective_date: Some(effective_date.to_string()),
            metadata: Some(json!({
                "appointment_id": appointment_id,
                "role_titles": titles,
            })),
        }
    }
}

/// Formats a `{year}-{sequence}` resolution number, zero-padded to 4 digits.
pub fn format_resolution_number(year: i32, sequence: u32) -> String {
    format!("{year}-{sequence:04}")
}

#[cfg(test)]
mod tests {
    use super::format_resolution_number;

    #[test]
    fn number_is_zero_padded_to_four_digits() {
        assert_eq!(format_resolution_number(2025, 7), "2025-0007");
        assert_eq!(format_resolution_number(2025, 12345), "2025-12345");
    }
}
