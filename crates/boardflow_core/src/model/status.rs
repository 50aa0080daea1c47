//! Appointment status machine.
//!
//! # Responsibility
//! - Define the strictly ordered appointment lifecycle.
//! - Derive signature-driven targets from linked document state.
//!
//! # Invariants
//! - Transitions are forward-only: a target applies only when its index is
//!   strictly greater than the current index, for every caller.
//! - The machine only reads document and resolution status; it never signs
//!   or adopts anything itself.

use crate::model::document::{GeneratedDocument, SigningStatus};
use serde::{Deserialize, Serialize};

/// Appointment lifecycle states, in strict forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Draft,
    SentToBoard,
    BoardAdopted,
    AwaitingSignatures,
    ReadyForSecretaryReview,
    SecretaryApproved,
    Activating,
    /// Terminal success state; only the activation saga reaches it.
    Active,
}

impl AppointmentStatus {
    /// Position in the forward-only ordering.
    pub fn index(self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::SentToBoard => 1,
            Self::BoardAdopted => 2,
            Self::AwaitingSignatures => 3,
            Self::ReadyForSecretaryReview => 4,
            Self::SecretaryApproved => 5,
            Self::Activating => 6,
            Self::Active => 7,
        }
    }

    /// Returns whether moving to `target` is a strictly forward transition.
    pub fn can_advance_to(self, target: AppointmentStatus) -> bool {
        target.index() > self.index()
    }

    /// Derives the signature-driven target from the linked documents.
    ///
    /// All documents signed maps to `ReadyForSecretaryReview`, a partial
    /// signature set to `AwaitingSignatures`, and no signatures (or no
    /// documents at all) to `None`, meaning the status stays where it is.
    pub fn derive_from_documents(documents: &[GeneratedDocument]) -> Option<AppointmentStatus> {
        if documents.is_empty() {
            return None;
        }
        let signed = documents
            .iter()
            .filter(|doc| doc.signing_status == SigningStatus::Signed)
            .count();
        if signed == documents.len() {
            Some(Self::ReadyForSecretaryReview)
        } else if signed > 0 {
            Some(Self::AwaitingSignatures)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppointmentStatus;
    use crate::model::document::{GeneratedDocument, SigningStatus};

    fn doc(status: SigningStatus) -> GeneratedDocument {
        let mut doc = GeneratedDocument::new("Acceptance", "multi_role_officer_acceptance", "<p/>");
        doc.signing_status = status;
        doc
    }

    #[test]
    fn ordering_is_strictly_increasing() {
        let states = [
            AppointmentStatus::Draft,
            AppointmentStatus::SentToBoard,
            AppointmentStatus::BoardAdopted,
            AppointmentStatus::AwaitingSignatures,
            AppointmentStatus::ReadyForSecretaryReview,
            AppointmentStatus::SecretaryApproved,
            AppointmentStatus::Activating,
            AppointmentStatus::Active,
        ];
        for window in states.windows(2) {
            assert!(window[0].can_advance_to(window[1]));
            assert!(!window[1].can_advance_to(window[0]));
        }
    }

    #[test]
    fn same_state_is_not_an_advance() {
        assert!(!AppointmentStatus::Activating.can_advance_to(AppointmentStatus::Activating));
    }

    #[test]
    fn all_signed_targets_secretary_review() {
        let docs = vec![doc(SigningStatus::Signed), doc(SigningStatus::Signed)];
        assert_eq!(
            AppointmentStatus::derive_from_documents(&docs),
            Some(AppointmentStatus::ReadyForSecretaryReview)
        );
    }

    #[test]
    fn partially_signed_targets_awaiting_signatures() {
        let docs = vec![doc(SigningStatus::Signed), doc(SigningStatus::Pending)];
        assert_eq!(
            AppointmentStatus::derive_from_documents(&docs),
            Some(AppointmentStatus::AwaitingSignatures)
        );
    }

    #[test]
    fn unsigned_or_empty_stays_put() {
        let docs = vec![doc(SigningStatus::Pending)];
        assert_eq!(AppointmentStatus::derive_from_documents(&docs), None);
        assert_eq!(AppointmentStatus::derive_from_documents(&[]), None);
    }
}
