//! Executive appointment activation saga.
//!
//! # Responsibility
//! - Drive the ten activation steps in order, appending one timeline event
//!   per successful step.
//!
//! # Invariants
//! - Steps 1-3 are critical: a failure aborts the run with status left at
//!   Activating, and the idempotent writes make a re-run safe.
//! - Steps 4-9 are non-critical: failures are caught, logged, recorded in
//!   the report, and execution continues.
//! - The finalize step is always attempted once steps 1-9 were attempted.

use crate::external::{BankingPacketGenerator, IdentityAccount, IdentityProvider, ObjectStore};
use crate::model::appointment::{Appointment, AppointmentId};
use crate::model::document::{
    SigningStatus, DOC_TYPE_CONFIDENTIALITY_IP, DOC_TYPE_CONFLICT_OF_INTEREST,
};
use crate::model::officer::{DirectoryRecord, LedgerEntry, OfficerStatus};
use crate::model::records::{
    AccessAccount, BankingAuthority, CompensationEntry, CompensationTrigger, ComplianceRecord,
    EquityEntry, BANKING_STATUS_PENDING_BANK_UPLOAD,
};
use crate::model::status::AppointmentStatus;
use crate::model::timeline::{event_types, GovernanceLogEntry, TimelineEvent};
use crate::repo::appointment_repo::{AppointmentRepository, SqliteAppointmentRepository};
use crate::repo::document_repo::{DocumentRepository, SqliteDocumentRepository};
use crate::repo::officer_repo::{
    OfficerDirectoryRepository, OfficerLedgerRepository, SqliteOfficerRepository,
};
use crate::repo::records_repo::{ActivationRecordsRepository, SqliteRecordsRepository};
use crate::repo::resolution_repo::{ResolutionRepository, SqliteResolutionRepository};
use crate::repo::settings_repo::SqliteSettingsRepository;
use crate::repo::timeline_repo::{
    GovernanceLogRepository, SqliteTimelineRepository, TimelineRepository,
};
use crate::repo::RepoResult;
use crate::template::builtin::CERTIFICATE_BODY;
use crate::template::engine::{interpolate, TemplateContext};
use crate::workflow::parsing::{
    access_role, banking_capabilities, is_deferred, parse_leading_number, primary_title,
    title_to_role, ROLE_EXECUTIVE,
};
use crate::workflow::triggers::long_form_date;
use crate::workflow::{SagaReport, SkippedStep, StepFailure, StepResult, WorkflowError,
    WorkflowResult};
use chrono::Utc;
use log::{info, warn};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

const DEFAULT_VESTING_MONTHS: u32 = 48;

/// Runs the ten-step activation workflow for one appointment.
pub struct ActivationSaga<'a> {
    conn: &'a Connection,
    identity: &'a dyn IdentityProvider,
    store: &'a dyn ObjectStore,
    packets: &'a dyn BankingPacketGenerator,
}

impl<'a> ActivationSaga<'a> {
    pub fn new(
        conn: &'a Connection,
        identity: &'a dyn IdentityProvider,
        store: &'a dyn ObjectStore,
        packets: &'a dyn BankingPacketGenerator,
    ) -> Self {
        Self {
            conn,
            identity,
            store,
            packets,
        }
    }

    pub fn run(&self, appointment_id: AppointmentId) -> WorkflowResult<SagaReport> {
        let appointments = SqliteAppointmentRepository::new(self.conn);
        let appointment = appointments
            .get_appointment(appointment_id)?
            .ok_or(WorkflowError::AppointmentNotFound(appointment_id))?;

        appointments.advance_status(appointment_id, AppointmentStatus::Activating)?;
        self.append_event(
            appointment_id,
            event_types::ACTIVATION_STARTED,
            "Executive activation workflow started",
            Some(json!({ "started_at": now_rfc3339() })),
        )?;

        let resolution_number = self.resolution_number(&appointment)?;
        let mut skipped = Vec::new();

        // Step 1: certificate (critical).
        let certificate_ref = self.critical(
            "generate_certificate",
            self.step_certificate(&appointment, resolution_number.as_deref()),
        )?;
        self.append_event(
            appointment_id,
            event_types::CERTIFICATE_GENERATED,
            "Appointment certificate generated",
            Some(json!({ "certificate_ref": certificate_ref })),
        )?;

        // Step 2: ledger entry (critical).
        self.critical(
            "officer_ledger",
            self.step_ledger(&appointment, &certificate_ref, resolution_number.as_deref()),
        )?;
        self.append_event(
            appointment_id,
            event_types::LEDGER_UPDATED,
            "Officer added to official ledger",
            None,
        )?;

        // Step 3: directory upsert (critical); its id feeds step 8.
        let officer_id = self.critical(
            "officer_directory",
            self.step_directory(&appointment, &certificate_ref),
        )?;
        self.append_event(
            appointment_id,
            event_types::OFFICER_RECORD_CREATED,
            "Corporate officer record created",
            Some(json!({ "officer_id": officer_id })),
        )?;

        // Identity is resolved once; steps 4-9 skip with a warning when the
        // appointee has no account.
        let identity = self.resolve_identity(&appointment);

        // Step 4: system roles (non-critical).
        if self
            .checked(
                "system_roles",
                self.step_roles(&appointment, identity.as_ref()),
                &mut skipped,
            )?
            .is_some()
        {
            self.append_event(
                appointment_id,
                event_types::ROLES_ASSIGNED,
                "System roles assigned",
                None,
            )?;
        }

        // Step 5: access account (non-critical).
        if self
            .checked(
                "access_account",
                self.step_access(&appointment, identity.as_ref()),
                &mut skipped,
            )?
            .is_some()
        {
            self.append_event(
                appointment_id,
                event_types::ACCESS_PROVISIONED,
                "Access account and permissions provisioned",
                None,
            )?;
        }

        // Step 6: equity (non-critical, only when included).
        if appointment.equity_included
            && self
                .checked(
                    "equity_activation",
                    self.step_equity(&appointment, identity.as_ref()),
                    &mut skipped,
                )?
                .is_some()
        {
            self.append_event(
                appointment_id,
                event_types::EQUITY_ACTIVATED,
                "Equity grants activated",
                None,
            )?;
        }

        // Step 7: compensation (non-critical).
        if self
            .checked(
                "compensation",
                self.step_compensation(&appointment, identity.as_ref()),
                &mut skipped,
            )?
            .is_some()
        {
            self.append_event(
                appointment_id,
                event_types::COMPENSATION_ADDED,
                "Compensation record created",
                None,
            )?;
        }

        // Step 8: banking authority (non-critical). Packet generation is
        // best-effort; its failure still records the prepared authority.
        match self.checked(
            "banking_authority",
            self.step_banking(&appointment, officer_id),
            &mut skipped,
        )? {
            Some(Some(packet_ref)) => {
                self.append_event(
                    appointment_id,
                    event_types::BANKING_AUTHORITY_PREPARED,
                    "Banking authorization packet generated",
                    Some(json!({ "packet_ref": packet_ref })),
                )?;
            }
            Some(None) => {
                self.append_event(
                    appointment_id,
                    event_types::BANKING_AUTHORITY_PREPARED,
                    "Banking authorization packet preparation attempted",
                    Some(json!({ "error": "packet generation failed, can be retried manually" })),
                )?;
            }
            None => {}
        }

        // Step 9: compliance (non-critical).
        if self
            .checked(
                "compliance",
                self.step_compliance(&appointment, identity.as_ref()),
                &mut skipped,
            )?
            .is_some()
        {
            self.append_event(
                appointment_id,
                event_types::COMPLIANCE_ACTIVATED,
                "Compliance records created",
                None,
            )?;
        }

        // Step 10: finalize.
        let activated_at = now_rfc3339();
        appointments.advance_status(appointment_id, AppointmentStatus::Active)?;
        appointments.set_activation_date(appointment_id, &activated_at)?;
        self.append_event(
            appointment_id,
            event_types::OFFICER_ACTIVATED,
            "Officer activation workflow completed successfully",
            Some(json!({ "activation_date": activated_at })),
        )?;

        let timelines = SqliteTimelineRepository::new(self.conn);
        timelines.append_log(&GovernanceLogEntry {
            uuid: Uuid::new_v4(),
            action: event_types::OFFICER_ACTIVATED.to_string(),
            entity_type: "APPOINTMENT".to_string(),
            entity_id: appointment_id.to_string(),
            description: format!(
                "Executive {} activated as {}",
                appointment.appointee_name,
                appointment.joined_titles()
            ),
            data: Some(json!({
                "officer_name": appointment.appointee_name,
                "title": appointment.joined_titles(),
                "activation_date": activated_at,
            })),
            created_at: now_millis(),
        })?;

        info!(
            "event=activation_saga module=workflow status=ok appointment={appointment_id} \
             skipped={}",
            skipped.len()
        );

        Ok(SagaReport {
            appointment_id,
            activated_at,
            skipped,
        })
    }

    /// A failure in the critical prefix aborts the saga regardless of the
    /// step's own classification.
    fn critical<T>(&self, step: &'static str, result: StepResult<T>) -> WorkflowResult<T> {
        result.map_err(|failure| WorkflowError::CriticalStep {
            step,
            source: failure.error,
        })
    }

    /// Uniform step-failure branching: critical failures abort the saga,
    /// recoverable ones are logged and recorded.
    fn checked<T>(
        &self,
        step: &'static str,
        result: StepResult<T>,
        skipped: &mut Vec<SkippedStep>,
    ) -> WorkflowResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(StepFailure {
                critical: true,
                error,
            }) => Err(WorkflowError::CriticalStep {
                step,
                source: error,
            }),
            Err(StepFailure { error, .. }) => {
                warn!("event=saga_step module=workflow status=error step={step} error={error}");
                skipped.push(SkippedStep {
                    step,
                    reason: error.to_string(),
                });
                Ok(None)
            }
        }
    }

    fn resolution_number(&self, appointment: &Appointment) -> WorkflowResult<Option<String>> {
        let Some(resolution_id) = appointment.resolution_id else {
            return Ok(None);
        };
        let resolutions = SqliteResolutionRepository::new(self.conn);
        Ok(resolutions
            .get_resolution(resolution_id)?
            .map(|resolution| resolution.resolution_number))
    }

    fn resolve_identity(&self, appointment: &Appointment) -> Option<IdentityAccount> {
        let Some(email) = appointment.appointee_email.as_deref() else {
            warn!(
                "event=identity_lookup module=workflow status=skip appointment={} \
                 reason=no_email",
                appointment.uuid
            );
            return None;
        };
        match self.identity.find_by_email(email) {
            Ok(Some(account)) => Some(account),
            Ok(None) => {
                warn!(
                    "event=identity_lookup module=workflow status=skip appointment={} \
                     email={email}",
                    appointment.uuid
                );
                None
            }
            Err(err) => {
                warn!(
                    "event=identity_lookup module=workflow status=error appointment={} \
                     error={err}",
                    appointment.uuid
                );
                None
            }
        }
    }

    fn step_certificate(
        &self,
        appointment: &Appointment,
        resolution_number: Option<&str>,
    ) -> StepResult<String> {
        let settings = SqliteSettingsRepository::new(self.conn)
            .company_settings()
            .map_err(StepFailure::critical)?;

        let mut context = TemplateContext::new();
        context.insert(
            "officer_name".to_string(),
            json!(appointment.appointee_name),
        );
        context.insert(
            "officer_title".to_string(),
            json!(appointment.joined_titles()),
        );
        context.insert("company_name".to_string(), json!(settings.company_name));
        context.insert(
            "state".to_string(),
            json!(settings.state_of_incorporation),
        );
        context.insert(
            "effective_date".to_string(),
            json!(long_form_date(&appointment.effective_date)),
        );
        context.insert(
            "resolution_number".to_string(),
            json!(resolution_number.unwrap_or("N/A")),
        );
        context.insert("issued_date".to_string(), json!(now_rfc3339()));

        let body = interpolate(CERTIFICATE_BODY, &context);
        let key = format!(
            "certificates/appointment_{}_{}.html",
            appointment.uuid,
            now_millis()
        );
        let certificate_ref = self
            .store
            .put(&key, &body)
            .map_err(StepFailure::critical)?;

        SqliteAppointmentRepository::new(self.conn)
            .set_certificate_ref(appointment.uuid, &certificate_ref)
            .map_err(StepFailure::critical)?;

        Ok(certificate_ref)
    }

    fn step_ledger(
        &self,
        appointment: &Appointment,
        certificate_ref: &str,
        resolution_number: Option<&str>,
    ) -> StepResult<()> {
        let officers = SqliteOfficerRepository::new(self.conn);
        let title = appointment.joined_titles();

        let exists = officers
            .ledger_entry_exists(appointment.uuid, &title)
            .map_err(StepFailure::critical)?;
        if exists {
            return Ok(());
        }

        officers
            .append_ledger(&LedgerEntry {
                uuid: Uuid::new_v4(),
                appointment_id: appointment.uuid,
                name: appointment.appointee_name.clone(),
                title,
                effective_date: appointment.effective_date.clone(),
                certificate_ref: Some(certificate_ref.to_string()),
                resolution_id: appointment.resolution_id,
                resolution_number: resolution_number.map(str::to_string),
                status: OfficerStatus::Active,
            })
            .map_err(StepFailure::critical)?;
        Ok(())
    }

    fn step_directory(
        &self,
        appointment: &Appointment,
        certificate_ref: &str,
    ) -> StepResult<Uuid> {
        let officers = SqliteOfficerRepository::new(self.conn);
        officers
            .upsert_directory(&DirectoryRecord {
                uuid: Uuid::new_v4(),
                name: appointment.appointee_name.clone(),
                email: appointment.appointee_email.clone().unwrap_or_default(),
                title: appointment.joined_titles(),
                effective_date: appointment.effective_date.clone(),
                certificate_ref: Some(certificate_ref.to_string()),
                appointed_by: appointment.resolution_id,
                status: OfficerStatus::Active,
            })
            .map_err(StepFailure::critical)
    }

    fn step_roles(
        &self,
        appointment: &Appointment,
        identity: Option<&IdentityAccount>,
    ) -> StepResult<()> {
        let Some(identity) = identity else {
            return Ok(());
        };

        let specific = title_to_role(primary_title(&appointment.role_titles));
        for role in [ROLE_EXECUTIVE, specific] {
            self.identity
                .assign_role(identity.id, role)
                .map_err(StepFailure::recoverable)?;
        }
        Ok(())
    }

    fn step_access(
        &self,
        appointment: &Appointment,
        identity: Option<&IdentityAccount>,
    ) -> StepResult<()> {
        let Some(identity) = identity else {
            return Ok(());
        };

        let records = SqliteRecordsRepository::new(self.conn);
        let exists = records
            .access_account_exists(identity.id)
            .map_err(StepFailure::recoverable)?;
        if exists {
            return Ok(());
        }

        records
            .insert_access_account(&AccessAccount {
                uuid: Uuid::new_v4(),
                identity_id: identity.id,
                role: access_role(primary_title(&appointment.role_titles)).to_string(),
                access_level: 1,
                title: appointment.joined_titles(),
                department: "Executive".to_string(),
            })
            .map_err(StepFailure::recoverable)?;
        Ok(())
    }

    fn step_equity(
        &self,
        appointment: &Appointment,
        identity: Option<&IdentityAccount>,
    ) -> StepResult<()> {
        let Some(identity) = identity else {
            return Ok(());
        };

        let shares = appointment
            .equity_details
            .as_deref()
            .and_then(parse_leading_number)
            .unwrap_or(0.0);
        if shares <= 0.0 {
            warn!(
                "event=equity_activation module=workflow status=skip appointment={} \
                 reason=unparsable_or_zero",
                appointment.uuid
            );
            return Ok(());
        }

        let records = SqliteRecordsRepository::new(self.conn);
        let exists = records
            .equity_exists(appointment.uuid)
            .map_err(StepFailure::recoverable)?;
        if exists {
            return Ok(());
        }

        records
            .insert_equity(&EquityEntry {
                uuid: Uuid::new_v4(),
                appointment_id: appointment.uuid,
                holder_identity: identity.id,
                shares_granted: shares,
                vesting_start: appointment.effective_date.clone(),
                vesting_months: appointment
                    .term_length_months
                    .unwrap_or(DEFAULT_VESTING_MONTHS),
            })
            .map_err(StepFailure::recoverable)?;
        Ok(())
    }

    fn step_compensation(
        &self,
        appointment: &Appointment,
        identity: Option<&IdentityAccount>,
    ) -> StepResult<()> {
        let Some(identity) = identity else {
            return Ok(());
        };

        let Some(base_salary) = appointment
            .compensation_structure
            .as_deref()
            .and_then(parse_leading_number)
        else {
            return Ok(());
        };

        let records = SqliteRecordsRepository::new(self.conn);
        let exists = records
            .compensation_exists(appointment.uuid)
            .map_err(StepFailure::recoverable)?;
        if exists {
            return Ok(());
        }

        let deferred = appointment
            .compensation_structure
            .as_deref()
            .map(is_deferred)
            .unwrap_or(false);

        records
            .insert_compensation(&CompensationEntry {
                uuid: Uuid::new_v4(),
                appointment_id: appointment.uuid,
                identity_id: identity.id,
                base_salary,
                is_deferred: deferred,
                trigger_status: if deferred {
                    CompensationTrigger::Pending
                } else {
                    CompensationTrigger::Active
                },
                activated_at: if deferred { None } else { Some(now_rfc3339()) },
            })
            .map_err(StepFailure::recoverable)?;
        Ok(())
    }

    fn step_banking(
        &self,
        appointment: &Appointment,
        officer_id: Uuid,
    ) -> StepResult<Option<String>> {
        let records = SqliteRecordsRepository::new(self.conn);
        let exists = records
            .banking_authority_exists(appointment.uuid)
            .map_err(StepFailure::recoverable)?;

        let packet_ref = match self.packets.generate_packet(appointment.uuid) {
            Ok(packet_ref) => Some(packet_ref),
            Err(err) => {
                warn!(
                    "event=banking_packet module=workflow status=error appointment={} \
                     error={err}",
                    appointment.uuid
                );
                None
            }
        };

        if !exists {
            let title = primary_title(&appointment.role_titles);
            let (wires, checks, treasury) = banking_capabilities(title);
            records
                .insert_banking_authority(&BankingAuthority {
                    uuid: Uuid::new_v4(),
                    appointment_id: appointment.uuid,
                    officer_id,
                    role: appointment.joined_titles(),
                    can_sign_wires: wires,
                    can_sign_checks: checks,
                    can_access_treasury_portal: treasury,
                    status: BANKING_STATUS_PENDING_BANK_UPLOAD.to_string(),
                    packet_ref: packet_ref.clone(),
                })
                .map_err(StepFailure::recoverable)?;
        }

        Ok(packet_ref)
    }

    fn step_compliance(
        &self,
        appointment: &Appointment,
        identity: Option<&IdentityAccount>,
    ) -> StepResult<()> {
        let Some(identity) = identity else {
            return Ok(());
        };

        let records = SqliteRecordsRepository::new(self.conn);
        let exists = records
            .compliance_exists(appointment.uuid)
            .map_err(StepFailure::recoverable)?;
        if exists {
            return Ok(());
        }

        let documents = SqliteDocumentRepository::new(self.conn)
            .list_for_appointment(appointment.uuid)
            .map_err(StepFailure::recoverable)?;

        let signed = |doc_type: &str| {
            documents
                .iter()
                .any(|doc| doc.doc_type == doc_type && doc.signing_status == SigningStatus::Signed)
        };

        records
            .insert_compliance(&ComplianceRecord {
                uuid: Uuid::new_v4(),
                appointment_id: appointment.uuid,
                identity_id: identity.id,
                nda_signed: signed(DOC_TYPE_CONFIDENTIALITY_IP),
                conflict_form_signed: signed(DOC_TYPE_CONFLICT_OF_INTEREST),
                identity_verified: true,
                background_verified: true,
                insurance_coverage: false,
            })
            .map_err(StepFailure::recoverable)?;
        Ok(())
    }

    fn append_event(
        &self,
        appointment_id: AppointmentId,
        event_type: &str,
        description: &str,
        metadata: Option<serde_json::Value>,
    ) -> RepoResult<Uuid> {
        SqliteTimelineRepository::new(self.conn).append_event(&TimelineEvent {
            uuid: Uuid::new_v4(),
            appointment_id,
            event_type: event_type.to_string(),
            description: description.to_string(),
            metadata,
            created_at: now_millis(),
        })
    }
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
