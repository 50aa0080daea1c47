//! Idempotent reconciliation sweep for stuck appointments.
//!
//! # Responsibility
//! - Re-establish the invariants activation depends on: identity account,
//!   appointment record, linked board resolution, generated documents, and a
//!   status consistent with resolution and signature state.
//!
//! # Invariants
//! - Sub-steps are tolerant: no sub-step aborts the appointment, and no
//!   appointment aborts the batch.
//! - Every creation is preceded by an existence check and every status
//!   change is strictly forward, so the sweep converges under repetition.

use crate::external::{ExternalError, IdentityProvider, NotificationSender};
use crate::model::appointment::{Appointment, AppointmentId, ResolutionId};
use crate::model::records::{AppointmentRecord, IdentityId};
use crate::model::resolution::{BoardResolution, ResolutionStatus};
use crate::model::status::AppointmentStatus;
use crate::repo::appointment_repo::{
    AppointmentQuery, AppointmentRecordRepository, AppointmentRepository,
    SqliteAppointmentRepository,
};
use crate::repo::document_repo::{DocumentRepository, SqliteDocumentRepository};
use crate::repo::resolution_repo::{ResolutionRepository, SqliteResolutionRepository};
use crate::workflow::triggers::{GovernanceEvent, TriggerMapper};
use crate::workflow::{WorkflowError, WorkflowResult};
use chrono::{Datelike, Utc};
use log::{info, warn};
use rusqlite::Connection;
use uuid::Uuid;

/// Matcher selecting the appointments to repair.
pub type SweepCriteria = AppointmentQuery;

/// Per-appointment repair outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairResult {
    pub appointment_id: AppointmentId,
    pub appointee_name: String,
    /// Setup (identity, record, resolution) succeeded and the workflow
    /// re-trigger went through.
    pub success: bool,
    /// Setup succeeded but the workflow re-trigger failed.
    pub partial_success: bool,
    pub identity_id: Option<IdentityId>,
    pub identity_created: bool,
    pub appointment_record_id: Option<Uuid>,
    pub appointment_record_created: bool,
    pub resolution_id: Option<ResolutionId>,
    pub resolution_created: bool,
    pub workflow_triggered: bool,
    pub workflow_error: Option<String>,
    pub status_before: AppointmentStatus,
    pub status_after: AppointmentStatus,
    /// Setup-phase failure, when one occurred.
    pub error: Option<String>,
}

/// Batch summary over all matched appointments.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub found: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<RepairResult>,
}

/// Runs the repair sub-steps over every appointment matching the criteria.
pub struct ReconciliationSweep<'a> {
    conn: &'a Connection,
    identity: &'a dyn IdentityProvider,
    notifier: &'a dyn NotificationSender,
}

impl<'a> ReconciliationSweep<'a> {
    pub fn new(
        conn: &'a Connection,
        identity: &'a dyn IdentityProvider,
        notifier: &'a dyn NotificationSender,
    ) -> Self {
        Self {
            conn,
            identity,
            notifier,
        }
    }

    pub fn run(&self, criteria: &SweepCriteria) -> WorkflowResult<SweepReport> {
        let appointments = SqliteAppointmentRepository::new(self.conn);
        let matched = appointments.list_appointments(criteria)?;

        let mut results = Vec::with_capacity(matched.len());
        for appointment in &matched {
            let result = self.repair_one(appointment);
            info!(
                "event=sweep_repair module=workflow status={} appointment={} \
                 partial={}",
                if result.success { "ok" } else { "error" },
                appointment.uuid,
                result.partial_success
            );
            results.push(result);
        }

        let successful = results.iter().filter(|r| r.success).count();
        let report = SweepReport {
            found: matched.len(),
            successful,
            failed: results.len() - successful,
            results,
        };
        Ok(report)
    }

    /// Repairs one appointment. Never raises: setup failures land in
    /// `error`, re-trigger failures in `workflow_error`.
    fn repair_one(&self, appointment: &Appointment) -> RepairResult {
        let mut result = RepairResult {
            appointment_id: appointment.uuid,
            appointee_name: appointment.appointee_name.clone(),
            success: false,
            partial_success: false,
            identity_id: None,
            identity_created: false,
            appointment_record_id: None,
            appointment_record_created: false,
            resolution_id: appointment.resolution_id,
            resolution_created: false,
            workflow_triggered: false,
            workflow_error: None,
            status_before: appointment.status,
            status_after: appointment.status,
            error: None,
        };

        let setup_ok = match self.run_setup(appointment, &mut result) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=sweep_setup module=workflow status=error appointment={} error={err}",
                    appointment.uuid
                );
                result.error = Some(err.to_string());
                false
            }
        };

        // Sub-step d: re-trigger the appointment workflow regardless of the
        // setup outcome.
        let mapper = TriggerMapper::new(self.conn, self.notifier);
        match mapper.run(&GovernanceEvent::OfficerAppointment {
            appointment_id: appointment.uuid,
        }) {
            Ok(_) => result.workflow_triggered = true,
            Err(err) => {
                warn!(
                    "event=sweep_retrigger module=workflow status=error appointment={} \
                     error={err}",
                    appointment.uuid
                );
                result.workflow_error = Some(err.to_string());
            }
        }

        // Sub-step e: status reconciliation.
        if let Err(err) = self.reconcile_status(appointment.uuid, &mut result) {
            warn!(
                "event=sweep_status module=workflow status=error appointment={} error={err}",
                appointment.uuid
            );
            if result.error.is_none() {
                result.error = Some(err.to_string());
            }
        }

        result.success = setup_ok && result.workflow_triggered;
        result.partial_success = setup_ok && !result.workflow_triggered;
        result
    }

    /// Sub-steps a-c: identity, appointment record, resolution.
    fn run_setup(
        &self,
        appointment: &Appointment,
        result: &mut RepairResult,
    ) -> WorkflowResult<()> {
        if let Some(email) = appointment.appointee_email.as_deref() {
            let (identity_id, created) =
                self.resolve_identity(email, &appointment.appointee_name)?;
            result.identity_id = identity_id;
            result.identity_created = created;

            if let Some(identity_id) = identity_id {
                self.ensure_appointment_record(appointment, identity_id, result)?;
            }
        } else {
            warn!(
                "event=sweep_identity module=workflow status=skip appointment={} \
                 reason=no_email",
                appointment.uuid
            );
        }

        self.ensure_resolution(appointment, result)?;
        Ok(())
    }

    /// Three-tier identity resolution: exact, case-insensitive, then create;
    /// an AlreadyExists refusal falls back to a case-insensitive re-query
    /// and finally a full scan. Creation and lookup are not transactional
    /// together, so the fallback tiers absorb the race.
    fn resolve_identity(
        &self,
        email: &str,
        name: &str,
    ) -> WorkflowResult<(Option<IdentityId>, bool)> {
        if let Some(account) = self.identity.find_by_email(email)? {
            return Ok((Some(account.id), false));
        }
        if let Some(account) = self.identity.find_by_email_ci(email)? {
            return Ok((Some(account.id), false));
        }

        match self.identity.create_account(email, name) {
            Ok(account) => Ok((Some(account.id), true)),
            Err(ExternalError::AlreadyExists(_)) => {
                if let Some(account) = self.identity.find_by_email_ci(email)? {
                    return Ok((Some(account.id), false));
                }
                if let Some(account) = self.identity.scan_by_email(email)? {
                    return Ok((Some(account.id), false));
                }
                warn!(
                    "event=sweep_identity module=workflow status=error email={email} \
                     reason=exists_but_unresolvable"
                );
                Ok((None, false))
            }
            Err(err) => Err(WorkflowError::External(err)),
        }
    }

    fn ensure_appointment_record(
        &self,
        appointment: &Appointment,
        identity_id: IdentityId,
        result: &mut RepairResult,
    ) -> WorkflowResult<()> {
        let records = SqliteAppointmentRepository::new(self.conn);
        if let Some(existing) = records.find_record(identity_id, &appointment.role_titles)? {
            result.appointment_record_id = Some(existing.uuid);
            return Ok(());
        }

        let record = AppointmentRecord {
            uuid: Uuid::new_v4(),
            identity_id,
            role_titles: appointment.role_titles.clone(),
            effective_date: appointment.effective_date.clone(),
        };
        result.appointment_record_id = Some(records.create_record(&record)?);
        result.appointment_record_created = true;
        Ok(())
    }

    fn ensure_resolution(
        &self,
        appointment: &Appointment,
        result: &mut RepairResult,
    ) -> WorkflowResult<()> {
        if appointment.resolution_id.is_some() {
            return Ok(());
        }

        let resolutions = SqliteResolutionRepository::new(self.conn);
        let appointments = SqliteAppointmentRepository::new(self.conn);

        let number = resolutions.next_resolution_number(Utc::now().year())?;
        let resolution = BoardResolution::for_appointment(
            number,
            appointment.uuid,
            &appointment.appointee_name,
            &appointment.role_titles,
            &appointment.effective_date,
        );
        let resolution_id = resolutions.create_resolution(&resolution)?;
        appointments.link_resolution(appointment.uuid, resolution_id)?;

        result.resolution_id = Some(resolution_id);
        result.resolution_created = true;
        Ok(())
    }

    /// Sub-step e: when the linked resolution is adopted, move the
    /// appointment at least to BoardAdopted, or further if signatures allow,
    /// strictly forward only.
    fn reconcile_status(
        &self,
        appointment_id: AppointmentId,
        result: &mut RepairResult,
    ) -> WorkflowResult<()> {
        let appointments = SqliteAppointmentRepository::new(self.conn);
        let appointment = appointments
            .get_appointment(appointment_id)?
            .ok_or(WorkflowError::AppointmentNotFound(appointment_id))?;
        result.status_after = appointment.status;

        let Some(resolution_id) = appointment.resolution_id else {
            return Ok(());
        };
        let resolutions = SqliteResolutionRepository::new(self.conn);
        let Some(resolution) = resolutions.get_resolution(resolution_id)? else {
            return Ok(());
        };
        if resolution.status != ResolutionStatus::Adopted {
            return Ok(());
        }

        let documents = SqliteDocumentRepository::new(self.conn)
            .list_for_appointment(appointment_id)?;
        let target = AppointmentStatus::derive_from_documents(&documents)
            .unwrap_or(AppointmentStatus::BoardAdopted);

        if appointments.advance_status(appointment_id, target)? {
            result.status_after = target;
        }
        Ok(())
    }
}
