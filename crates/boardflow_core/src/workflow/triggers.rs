//! Workflow trigger mapper: governance events to generated documents.
//!
//! # Responsibility
//! - Map each governance event to its ordered template list and context.
//! - Perform the appointment follow-ups: draft resolution, onboarding
//!   checklist, appointee notification.
//!
//! # Invariants
//! - Templates are generated independently; one failure is logged and
//!   skipped, never rolled back, and only successful document ids are
//!   returned.
//! - Follow-up failures (resolution, onboarding, notification) never fail
//!   the overall call once documents were created.

use crate::external::NotificationSender;
use crate::model::appointment::{Appointment, AppointmentId};
use crate::model::document::DocumentId;
use crate::model::records::OnboardingChecklist;
use crate::model::resolution::BoardResolution;
use crate::repo::appointment_repo::{AppointmentRepository, SqliteAppointmentRepository};
use crate::repo::records_repo::{ActivationRecordsRepository, SqliteRecordsRepository};
use crate::repo::resolution_repo::{ResolutionRepository, SqliteResolutionRepository};
use crate::repo::settings_repo::SqliteSettingsRepository;
use crate::template::engine::{DocumentEngine, TemplateContext};
use crate::template::registry::{lookup, TemplateId};
use crate::workflow::parsing::is_ceo_title;
use crate::workflow::{WorkflowError, WorkflowResult};
use chrono::{Datelike, NaiveDate, Utc};
use log::{info, warn};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

/// Governance events the mapper reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GovernanceEvent {
    InitialBoardSetup {
        director_name: String,
        director_email: String,
    },
    OfficerAppointment {
        appointment_id: AppointmentId,
    },
    EquitySetup,
    BankingSetup {
        officer_name: String,
        officer_email: String,
    },
    RegisteredAgentSetup {
        director_name: String,
        agent_name: String,
        agent_address: String,
    },
}

/// Maps governance events onto the document engine and follow-up records.
pub struct TriggerMapper<'a> {
    conn: &'a Connection,
    notifier: &'a dyn NotificationSender,
}

impl<'a> TriggerMapper<'a> {
    pub fn new(conn: &'a Connection, notifier: &'a dyn NotificationSender) -> Self {
        Self { conn, notifier }
    }

    /// Generates the documents for `event`, returning the ids that were
    /// successfully created.
    pub fn run(&self, event: &GovernanceEvent) -> WorkflowResult<Vec<DocumentId>> {
        match event {
            GovernanceEvent::InitialBoardSetup {
                director_name,
                director_email,
            } => {
                let mut context = self.common_context()?;
                let today = long_form_today();
                for key in ["incorporator_name", "director_name", "officer_name"] {
                    context.insert(key.to_string(), json!(director_name));
                }
                for key in ["incorporator_email", "director_email", "officer_email"] {
                    context.insert(key.to_string(), json!(director_email));
                }
                for key in [
                    "consent_date",
                    "director_consent_date",
                    "minutes_date",
                    "meeting_date",
                ] {
                    context.insert(key.to_string(), json!(today));
                }
                self.generate(
                    &[
                        TemplateId::InitialActionSoleDirector,
                        TemplateId::OrgMinutesSoleDirector,
                    ],
                    &context,
                    None,
                )
            }
            GovernanceEvent::OfficerAppointment { appointment_id } => {
                self.run_officer_appointment(*appointment_id)
            }
            GovernanceEvent::EquitySetup => {
                let mut context = self.common_context()?;
                context.insert("resolution_date".to_string(), json!(long_form_today()));
                self.generate(
                    &[
                        TemplateId::StockIssuanceResolution,
                        TemplateId::CapTableExhibit,
                    ],
                    &context,
                    None,
                )
            }
            GovernanceEvent::BankingSetup {
                officer_name,
                officer_email,
            } => {
                let mut context = self.common_context()?;
                context.insert("officer_name".to_string(), json!(officer_name));
                context.insert("officer_email".to_string(), json!(officer_email));
                context.insert("resolution_date".to_string(), json!(long_form_today()));
                self.generate(&[TemplateId::BankingResolution], &context, None)
            }
            GovernanceEvent::RegisteredAgentSetup {
                director_name,
                agent_name,
                agent_address,
            } => {
                let mut context = self.common_context()?;
                context.insert("director_name".to_string(), json!(director_name));
                context.insert("registered_agent_name".to_string(), json!(agent_name));
                context.insert("registered_agent_address".to_string(), json!(agent_address));
                context.insert("resolution_date".to_string(), json!(long_form_today()));
                self.generate(&[TemplateId::RegisteredAgentResolution], &context, None)
            }
        }
    }

    fn run_officer_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> WorkflowResult<Vec<DocumentId>> {
        let appointments = SqliteAppointmentRepository::new(self.conn);
        let appointment = appointments
            .get_appointment(appointment_id)?
            .ok_or(WorkflowError::AppointmentNotFound(appointment_id))?;

        let mut templates = vec![
            TemplateId::OfficerAppointmentResolution,
            TemplateId::OfficerAcceptance,
        ];
        if is_ceo_title(&appointment.role_titles) {
            templates.push(TemplateId::CeoAppointmentResolution);
        }

        let context = self.appointment_context(&appointment)?;
        let document_ids = self.generate(&templates, &context, Some(appointment_id))?;

        self.ensure_draft_resolution(&appointment);
        self.upsert_onboarding(&appointment, &templates);

        if !document_ids.is_empty() {
            if let Err(err) = self
                .notifier
                .notify_documents_ready(appointment_id, &document_ids)
            {
                warn!(
                    "event=appointee_notification module=workflow status=error \
                     appointment={appointment_id} error={err}"
                );
            }
        }

        Ok(document_ids)
    }

    /// Renders and persists each template in order, skipping failures.
    fn generate(
        &self,
        templates: &[TemplateId],
        context: &TemplateContext,
        appointment_id: Option<AppointmentId>,
    ) -> WorkflowResult<Vec<DocumentId>> {
        let engine = DocumentEngine::new(self.conn);
        let mut document_ids = Vec::new();

        for &template_id in templates {
            let meta = lookup(template_id);
            let outcome = engine
                .render(template_id, context)
                .and_then(|body| engine.persist(appointment_id, meta, body));
            match outcome {
                Ok(document_id) => {
                    info!(
                        "event=template_generation module=workflow status=ok \
                         template={} document={document_id}",
                        template_id.as_str()
                    );
                    document_ids.push(document_id);
                }
                Err(err) => {
                    warn!(
                        "event=template_generation module=workflow status=error \
                         template={} error={err}",
                        template_id.as_str()
                    );
                }
            }
        }

        Ok(document_ids)
    }

    /// Creates a PENDING_VOTE resolution when the appointment has none.
    /// Failure is logged, not raised: the documents were already created.
    fn ensure_draft_resolution(&self, appointment: &Appointment) {
        if appointment.resolution_id.is_some() {
            return;
        }

        let resolutions = SqliteResolutionRepository::new(self.conn);
        let appointments = SqliteAppointmentRepository::new(self.conn);
        let year = Utc::now().year();

        let outcome = resolutions
            .next_resolution_number(year)
            .and_then(|number| {
                let resolution = BoardResolution::for_appointment(
                    number,
                    appointment.uuid,
                    &appointment.appointee_name,
                    &appointment.role_titles,
                    &appointment.effective_date,
                );
                resolutions.create_resolution(&resolution)
            })
            .and_then(|resolution_id| {
                appointments.link_resolution(appointment.uuid, resolution_id)
            });

        if let Err(err) = outcome {
            warn!(
                "event=draft_resolution module=workflow status=error appointment={} error={err}",
                appointment.uuid
            );
        }
    }

    fn upsert_onboarding(&self, appointment: &Appointment, templates: &[TemplateId]) {
        let records = SqliteRecordsRepository::new(self.conn);
        let checklist = OnboardingChecklist {
            uuid: Uuid::new_v4(),
            appointment_id: appointment.uuid,
            identity_id: None,
            status: "pending".to_string(),
            documents_required: templates.iter().map(|id| id.as_str().to_string()).collect(),
            documents_completed: Vec::new(),
        };

        if let Err(err) = records.upsert_onboarding(&checklist) {
            warn!(
                "event=onboarding_upsert module=workflow status=error appointment={} error={err}",
                appointment.uuid
            );
        }
    }

    fn common_context(&self) -> WorkflowResult<TemplateContext> {
        let settings = SqliteSettingsRepository::new(self.conn).company_settings()?;
        let mut context = TemplateContext::new();
        context.insert("company_name".to_string(), json!(settings.company_name));
        context.insert(
            "state_of_incorporation".to_string(),
            json!(settings.state_of_incorporation),
        );
        context.insert(
            "registered_office".to_string(),
            json!(settings.registered_office),
        );
        Ok(context)
    }

    fn appointment_context(&self, appointment: &Appointment) -> WorkflowResult<TemplateContext> {
        let mut context = self.common_context()?;
        context.insert(
            "officer_name".to_string(),
            json!(appointment.appointee_name),
        );
        context.insert(
            "officer_email".to_string(),
            match &appointment.appointee_email {
                Some(email) => json!(email),
                None => serde_json::Value::Null,
            },
        );
        context.insert(
            "officer_title".to_string(),
            json!(appointment.joined_titles()),
        );
        context.insert(
            "effective_date".to_string(),
            json!(long_form_date(&appointment.effective_date)),
        );
        context.insert("resolution_date".to_string(), json!(long_form_today()));
        context.insert("consent_date".to_string(), json!(long_form_today()));
        Ok(context)
    }
}

/// Formats an ISO calendar date as `Month D, YYYY`, passing unparsable
/// values through unchanged.
pub fn long_form_date(iso_date: &str) -> String {
    match NaiveDate::parse_from_str(iso_date, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => iso_date.to_string(),
    }
}

fn long_form_today() -> String {
    Utc::now().date_naive().format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::long_form_date;

    #[test]
    fn iso_dates_render_long_form() {
        assert_eq!(long_form_date("2025-03-01"), "March 1, 2025");
        assert_eq!(long_form_date("2025-12-31"), "December 31, 2025");
    }

    #[test]
    fn unparsable_dates_pass_through() {
        assert_eq!(long_form_date("sometime soon"), "sometime soon");
    }
}
