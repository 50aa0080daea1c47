//! Core domain logic for BoardFlow corporate-governance automation.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod external;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod template;
pub mod workflow;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::appointment::{Appointment, AppointmentId, AppointmentValidationError};
pub use model::status::AppointmentStatus;
pub use repo::appointment_repo::{
    AppointmentQuery, AppointmentRepository, SqliteAppointmentRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::governance_service::GovernanceService;
pub use workflow::sweep::{RepairResult, SweepCriteria, SweepReport};
pub use workflow::triggers::GovernanceEvent;
pub use workflow::{SagaReport, WorkflowError, WorkflowResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
