//! External collaborator seams.
//!
//! # Responsibility
//! - Define the narrow, synchronous interfaces the workflows consume:
//!   identity provider, object store, notification sender, banking packet
//!   generator.
//!
//! # Invariants
//! - Implementations own their timeout and retry policy; callers treat every
//!   call as a single fallible operation.
//! - `assign_role` is idempotent: assigning a role an identity already holds
//!   succeeds without duplication.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod in_memory;

pub type ExternalResult<T> = Result<T, ExternalError>;

/// Failures surfaced by external collaborators.
#[derive(Debug)]
pub enum ExternalError {
    /// Creation refused because an equivalent record already exists.
    AlreadyExists(String),
    /// The collaborator could not serve the call.
    Unavailable {
        service: &'static str,
        message: String,
    },
}

impl Display for ExternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(detail) => write!(f, "already exists: {detail}"),
            Self::Unavailable { service, message } => {
                write!(f, "{service} unavailable: {message}")
            }
        }
    }
}

impl Error for ExternalError {}

/// Account record held by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAccount {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Identity provider lookup, creation, and role assignment.
pub trait IdentityProvider {
    /// Exact (case-sensitive) email lookup.
    fn find_by_email(&self, email: &str) -> ExternalResult<Option<IdentityAccount>>;
    /// Case-insensitive email lookup.
    fn find_by_email_ci(&self, email: &str) -> ExternalResult<Option<IdentityAccount>>;
    /// Full account scan, the last-resort fallback tier.
    fn scan_by_email(&self, email: &str) -> ExternalResult<Option<IdentityAccount>>;
    fn create_account(&self, email: &str, name: &str) -> ExternalResult<IdentityAccount>;
    /// Idempotent (identity, role) upsert.
    fn assign_role(&self, identity_id: Uuid, role: &str) -> ExternalResult<()>;
}

/// Blob storage for rendered certificates.
pub trait ObjectStore {
    /// Stores `body` under `key` and returns a stable reference.
    fn put(&self, key: &str, body: &str) -> ExternalResult<String>;
}

/// Best-effort appointee notification.
pub trait NotificationSender {
    fn notify_documents_ready(
        &self,
        appointment_id: Uuid,
        document_ids: &[Uuid],
    ) -> ExternalResult<()>;
}

/// Produces the signature packet a bank requires for authority uploads.
pub trait BankingPacketGenerator {
    fn generate_packet(&self, appointment_id: Uuid) -> ExternalResult<String>;
}
