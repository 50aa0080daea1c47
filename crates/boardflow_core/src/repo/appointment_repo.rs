//! Appointment repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `appointments` storage.
//! - Enforce the forward-only status rule at the single write path.
//!
//! # Invariants
//! - Write paths must call `Appointment::validate()` before SQL mutations.
//! - `update_appointment` never touches `status`; every status change goes
//!   through `advance_status`, which refuses regressions and no-ops.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::model::appointment::{Appointment, AppointmentId, ResolutionId};
use crate::model::records::{AppointmentRecord, IdentityId};
use crate::model::status::AppointmentStatus;
use crate::repo::{bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const APPOINTMENT_SELECT_SQL: &str = "SELECT
    uuid,
    appointee_name,
    appointee_email,
    role_titles,
    effective_date,
    term_length_months,
    status,
    resolution_id,
    equity_included,
    equity_details,
    compensation_structure,
    formation_mode,
    certificate_ref,
    activation_date
FROM appointments";

/// Query options for listing appointments. All filters are conjunctive;
/// `name_contains` and `email_contains` match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct AppointmentQuery {
    pub name_contains: Option<String>,
    pub email_contains: Option<String>,
    /// Empty means any status.
    pub statuses: Vec<AppointmentStatus>,
}

/// Repository interface for appointment CRUD and lifecycle writes.
pub trait AppointmentRepository {
    fn create_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId>;
    fn update_appointment(&self, appointment: &Appointment) -> RepoResult<()>;
    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>>;
    fn list_appointments(&self, query: &AppointmentQuery) -> RepoResult<Vec<Appointment>>;
    /// Moves `id` to `target` if that is a strictly forward transition.
    /// Returns whether the row changed; a refused regression is `Ok(false)`.
    fn advance_status(&self, id: AppointmentId, target: AppointmentStatus) -> RepoResult<bool>;
    fn set_certificate_ref(&self, id: AppointmentId, certificate_ref: &str) -> RepoResult<()>;
    fn link_resolution(&self, id: AppointmentId, resolution_id: ResolutionId) -> RepoResult<()>;
    fn set_activation_date(&self, id: AppointmentId, activation_date: &str) -> RepoResult<()>;
}

/// Repository interface for the sweep's lightweight appointment records.
pub trait AppointmentRecordRepository {
    /// Finds a record for `identity_id` carrying exactly `role_titles`.
    fn find_record(
        &self,
        identity_id: IdentityId,
        role_titles: &[String],
    ) -> RepoResult<Option<AppointmentRecord>>;
    fn create_record(&self, record: &AppointmentRecord) -> RepoResult<Uuid>;
}

/// SQLite-backed appointment repository.
pub struct SqliteAppointmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAppointmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AppointmentRepository for SqliteAppointmentRepository<'_> {
    fn create_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId> {
        appointment.validate()?;

        self.conn.execute(
            "INSERT INTO appointments (
                uuid,
                appointee_name,
                appointee_email,
                role_titles,
                effective_date,
                term_length_months,
                status,
                resolution_id,
                equity_included,
                equity_details,
                compensation_structure,
                formation_mode,
                certificate_ref,
                activation_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                appointment.uuid.to_string(),
                appointment.appointee_name.as_str(),
                appointment.appointee_email.as_deref(),
                serde_json::to_string(&appointment.role_titles)?,
                appointment.effective_date.as_str(),
                appointment.term_length_months,
                status_to_db(appointment.status),
                appointment.resolution_id.map(|id| id.to_string()),
                bool_to_int(appointment.equity_included),
                appointment.equity_details.as_deref(),
                appointment.compensation_structure.as_deref(),
                bool_to_int(appointment.formation_mode),
                appointment.certificate_ref.as_deref(),
                appointment.activation_date.as_deref(),
            ],
        )?;

        Ok(appointment.uuid)
    }

    fn update_appointment(&self, appointment: &Appointment) -> RepoResult<()> {
        appointment.validate()?;

        let changed = self.conn.execute(
            "UPDATE appointments
             SET
                appointee_name = ?1,
                appointee_email = ?2,
                role_titles = ?3,
                effective_date = ?4,
                term_length_months = ?5,
                equity_included = ?6,
                equity_details = ?7,
                compensation_structure = ?8,
                formation_mode = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10;",
            params![
                appointment.appointee_name.as_str(),
                appointment.appointee_email.as_deref(),
                serde_json::to_string(&appointment.role_titles)?,
                appointment.effective_date.as_str(),
                appointment.term_length_months,
                bool_to_int(appointment.equity_included),
                appointment.equity_details.as_deref(),
                appointment.compensation_structure.as_deref(),
                bool_to_int(appointment.formation_mode),
                appointment.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "appointment",
                id: appointment.uuid.to_string(),
            });
        }

        Ok(())
    }

    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{APPOINTMENT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_appointment_row(row)?));
        }

        Ok(None)
    }

    fn list_appointments(&self, query: &AppointmentQuery) -> RepoResult<Vec<Appointment>> {
        let mut sql = format!("{APPOINTMENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(fragment) = &query.name_contains {
            sql.push_str(" AND appointee_name LIKE ?");
            bind_values.push(Value::Text(format!("%{fragment}%")));
        }

        if let Some(fragment) = &query.email_contains {
            sql.push_str(" AND appointee_email LIKE ?");
            bind_values.push(Value::Text(format!("%{fragment}%")));
        }

        if !query.statuses.is_empty() {
            let placeholders = vec!["?"; query.statuses.len()].join(", ");
            sql.push_str(&format!(" AND status IN ({placeholders})"));
            for status in &query.statuses {
                bind_values.push(Value::Text(status_to_db(*status).to_string()));
            }
        }

        sql.push_str(" ORDER BY created_at ASC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut appointments = Vec::new();

        while let Some(row) = rows.next()? {
            appointments.push(parse_appointment_row(row)?);
        }

        Ok(appointments)
    }

    fn advance_status(&self, id: AppointmentId, target: AppointmentStatus) -> RepoResult<bool> {
        let current: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM appointments WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let current = match current {
            Some(value) => parse_status(&value).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid status `{value}` in appointments.status"
                ))
            })?,
            None => {
                return Err(RepoError::NotFound {
                    entity: "appointment",
                    id: id.to_string(),
                });
            }
        };

        if !current.can_advance_to(target) {
            return Ok(false);
        }

        self.conn.execute(
            "UPDATE appointments
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![status_to_db(target), id.to_string()],
        )?;

        Ok(true)
    }

    fn set_certificate_ref(&self, id: AppointmentId, certificate_ref: &str) -> RepoResult<()> {
        self.set_column(id, "certificate_ref", certificate_ref)
    }

    fn link_resolution(&self, id: AppointmentId, resolution_id: ResolutionId) -> RepoResult<()> {
        self.set_column(id, "resolution_id", &resolution_id.to_string())
    }

    fn set_activation_date(&self, id: AppointmentId, activation_date: &str) -> RepoResult<()> {
        self.set_column(id, "activation_date", activation_date)
    }
}

impl SqliteAppointmentRepository<'_> {
    fn set_column(&self, id: AppointmentId, column: &'static str, value: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE appointments
                 SET
                    {column} = ?1,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?2;"
            ),
            params![value, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "appointment",
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

impl AppointmentRecordRepository for SqliteAppointmentRepository<'_> {
    fn find_record(
        &self,
        identity_id: IdentityId,
        role_titles: &[String],
    ) -> RepoResult<Option<AppointmentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, identity_id, role_titles, effective_date
             FROM appointment_records
             WHERE identity_id = ?1
             ORDER BY created_at ASC;",
        )?;

        let mut rows = stmt.query([identity_id.to_string()])?;
        while let Some(row) = rows.next()? {
            let record = parse_record_row(row)?;
            if record.role_titles == role_titles {
                return Ok(Some(record));
            }
        }

        Ok(None)
    }

    fn create_record(&self, record: &AppointmentRecord) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO appointment_records (
                uuid,
                identity_id,
                role_titles,
                effective_date
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                record.uuid.to_string(),
                record.identity_id.to_string(),
                serde_json::to_string(&record.role_titles)?,
                record.effective_date.as_str(),
            ],
        )?;

        Ok(record.uuid)
    }
}

fn parse_appointment_row(row: &Row<'_>) -> RepoResult<Appointment> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "appointments.uuid")?;

    let titles_text: String = row.get("role_titles")?;
    let role_titles: Vec<String> = serde_json::from_str(&titles_text)?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in appointments.status"
        ))
    })?;

    let resolution_id = match row.get::<_, Option<String>>("resolution_id")? {
        Some(value) => Some(parse_uuid(&value, "appointments.resolution_id")?),
        None => None,
    };

    let appointment = Appointment {
        uuid,
        appointee_name: row.get("appointee_name")?,
        appointee_email: row.get("appointee_email")?,
        role_titles,
        effective_date: row.get("effective_date")?,
        term_length_months: row.get("term_length_months")?,
        status,
        resolution_id,
        equity_included: int_to_bool(
            row.get("equity_included")?,
            "appointments.equity_included",
        )?,
        equity_details: row.get("equity_details")?,
        compensation_structure: row.get("compensation_structure")?,
        formation_mode: int_to_bool(row.get("formation_mode")?, "appointments.formation_mode")?,
        certificate_ref: row.get("certificate_ref")?,
        activation_date: row.get("activation_date")?,
    };
    appointment.validate()?;
    Ok(appointment)
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<AppointmentRecord> {
    let uuid_text: String = row.get("uuid")?;
    let identity_text: String = row.get("identity_id")?;
    let titles_text: String = row.get("role_titles")?;

    Ok(AppointmentRecord {
        uuid: parse_uuid(&uuid_text, "appointment_records.uuid")?,
        identity_id: parse_uuid(&identity_text, "appointment_records.identity_id")?,
        role_titles: serde_json::from_str(&titles_text)?,
        effective_date: row.get("effective_date")?,
    })
}

pub fn status_to_db(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Draft => "DRAFT",
        AppointmentStatus::SentToBoard => "SENT_TO_BOARD",
        AppointmentStatus::BoardAdopted => "BOARD_ADOPTED",
        AppointmentStatus::AwaitingSignatures => "AWAITING_SIGNATURES",
        AppointmentStatus::ReadyForSecretaryReview => "READY_FOR_SECRETARY_REVIEW",
        AppointmentStatus::SecretaryApproved => "SECRETARY_APPROVED",
        AppointmentStatus::Activating => "ACTIVATING",
        AppointmentStatus::Active => "ACTIVE",
    }
}

pub fn parse_status(value: &str) -> Option<AppointmentStatus> {
    match value {
        "DRAFT" => Some(AppointmentStatus::Draft),
        "SENT_TO_BOARD" => Some(AppointmentStatus::SentToBoard),
        "BOARD_ADOPTED" => Some(AppointmentStatus::BoardAdopted),
        "AWAITING_SIGNATURES" => Some(AppointmentStatus::AwaitingSignatures),
        "READY_FOR_SECRETARY_REVIEW" => Some(AppointmentStatus::ReadyForSecretaryReview),
        "SECRETARY_APPROVED" => Some(AppointmentStatus::SecretaryApproved),
        "ACTIVATING" => Some(AppointmentStatus::Activating),
        "ACTIVE" => Some(AppointmentStatus::Active),
        _ => None,
    }
}
