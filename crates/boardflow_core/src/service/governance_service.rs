//! Governance use-case service.
//!
//! # Responsibility
//! - Provide the stable entry points consumed by presentation layers:
//!   template rendering, workflow triggers, the activation saga, the
//!   reconciliation sweep, and read-only projections.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - All orchestration lives in the workflow layer; this facade only wires
//!   collaborators together.

use crate::external::{
    BankingPacketGenerator, IdentityProvider, NotificationSender, ObjectStore,
};
use crate::model::appointment::{Appointment, AppointmentId};
use crate::model::document::DocumentId;
use crate::model::officer::{DirectoryRecord, OfficerStatus};
use crate::model::timeline::TimelineEvent;
use crate::repo::appointment_repo::{AppointmentRepository, SqliteAppointmentRepository};
use crate::repo::officer_repo::{OfficerDirectoryRepository, SqliteOfficerRepository};
use crate::repo::timeline_repo::{SqliteTimelineRepository, TimelineRepository};
use crate::template::engine::{DocumentEngine, TemplateContext};
use crate::workflow::saga::ActivationSaga;
use crate::workflow::sweep::{ReconciliationSweep, SweepCriteria, SweepReport};
use crate::workflow::triggers::{GovernanceEvent, TriggerMapper};
use crate::workflow::{SagaReport, WorkflowResult};
use rusqlite::Connection;

/// Facade over repositories, workflows, and external collaborators.
pub struct GovernanceService<'a> {
    conn: &'a Connection,
    identity: &'a dyn IdentityProvider,
    store: &'a dyn ObjectStore,
    notifier: &'a dyn NotificationSender,
    packets: &'a dyn BankingPacketGenerator,
}

impl<'a> GovernanceService<'a> {
    pub fn new(
        conn: &'a Connection,
        identity: &'a dyn IdentityProvider,
        store: &'a dyn ObjectStore,
        notifier: &'a dyn NotificationSender,
        packets: &'a dyn BankingPacketGenerator,
    ) -> Self {
        Self {
            conn,
            identity,
            store,
            notifier,
            packets,
        }
    }

    /// Renders the catalog template named `id` against `context`.
    pub fn render_template(&self, id: &str, context: &TemplateContext) -> WorkflowResult<String> {
        Ok(DocumentEngine::new(self.conn).render_by_name(id, context)?)
    }

    /// Maps a governance event to generated documents.
    pub fn trigger(&self, event: &GovernanceEvent) -> WorkflowResult<Vec<DocumentId>> {
        TriggerMapper::new(self.conn, self.notifier).run(event)
    }

    /// Runs the ten-step activation saga for one appointment.
    pub fn run_activation_saga(&self, appointment_id: AppointmentId) -> WorkflowResult<SagaReport> {
        ActivationSaga::new(self.conn, self.identity, self.store, self.packets)
            .run(appointment_id)
    }

    /// Runs the reconciliation sweep over appointments matching `criteria`.
    pub fn run_reconciliation_sweep(
        &self,
        criteria: &SweepCriteria,
    ) -> WorkflowResult<SweepReport> {
        ReconciliationSweep::new(self.conn, self.identity, self.notifier).run(criteria)
    }

    /// Appointment projection by id.
    pub fn appointment(&self, id: AppointmentId) -> WorkflowResult<Option<Appointment>> {
        Ok(SqliteAppointmentRepository::new(self.conn).get_appointment(id)?)
    }

    /// Timeline projection for one appointment, in insertion order.
    pub fn timeline(&self, appointment_id: AppointmentId) -> WorkflowResult<Vec<TimelineEvent>> {
        Ok(SqliteTimelineRepository::new(self.conn).list_for_appointment(appointment_id)?)
    }

    /// Officer directory projection, optionally filtered by status.
    pub fn directory(&self, status: Option<OfficerStatus>) -> WorkflowResult<Vec<DirectoryRecord>> {
        Ok(SqliteOfficerRepository::new(self.conn).list_directory(status)?)
    }
}
