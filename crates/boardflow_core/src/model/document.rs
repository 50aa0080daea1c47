//! Generated document domain model.
//!
//! # Invariants
//! - A generated document is immutable except for `signing_status`, which is
//!   driven by the external signing surface.
//! - Documents may exist unlinked (company-level filings) or linked to one
//!   appointment through the link table.

use crate::model::appointment::AppointmentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a generated document.
pub type DocumentId = Uuid;

/// External signing progress for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningStatus {
    Pending,
    Signed,
}

/// Document types the compliance step inspects on linked documents.
pub const DOC_TYPE_CONFIDENTIALITY_IP: &str = "confidentiality_ip";
pub const DOC_TYPE_CONFLICT_OF_INTEREST: &str = "conflict_of_interest";

/// A rendered, persisted governance document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub uuid: DocumentId,
    pub title: String,
    /// Open string namespace; registry templates map into it, HR and
    /// compliance uploads use their own types.
    pub doc_type: String,
    pub body: String,
    pub signing_status: SigningStatus,
    /// Signer descriptors collected by the signing surface.
    pub signers: Vec<String>,
    pub appointment_id: Option<AppointmentId>,
}

impl GeneratedDocument {
    /// Creates an unsigned document with a generated stable ID.
    pub fn new(
        title: impl Into<String>,
        doc_type: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            doc_type: doc_type.into(),
            body: body.into(),
            signing_status: SigningStatus::Pending,
            signers: Vec::new(),
            appointment_id: None,
        }
    }
}
