//! Officer ledger and directory repositories.
//!
//! # Responsibility
//! - Append-only writes to the historical officer ledger.
//! - Upsert semantics for the (email, title)-keyed directory projection.
//!
//! # Invariants
//! - The ledger has no UPDATE or DELETE path; `ledger_entry_exists` is the
//!   idempotency check callers run before appending.
//! - A directory upsert returns the surviving row's uuid, whether the row
//!   was inserted or updated.

use crate::model::appointment::AppointmentId;
use crate::model::officer::{DirectoryRecord, LedgerEntry, OfficerStatus};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

/// Repository interface for the append-only officer ledger.
pub trait OfficerLedgerRepository {
    /// Whether a ledger entry already exists for this appointment and title.
    fn ledger_entry_exists(&self, appointment_id: AppointmentId, title: &str) -> RepoResult<bool>;
    fn append_ledger(&self, entry: &LedgerEntry) -> RepoResult<Uuid>;
    fn list_ledger(&self, appointment_id: AppointmentId) -> RepoResult<Vec<LedgerEntry>>;
}

/// Repository interface for the officer directory projection.
pub trait OfficerDirectoryRepository {
    /// Inserts or refreshes the (email, title) row and returns its uuid.
    fn upsert_directory(&self, record: &DirectoryRecord) -> RepoResult<Uuid>;
    fn list_directory(&self, status: Option<OfficerStatus>) -> RepoResult<Vec<DirectoryRecord>>;
}

/// SQLite-backed officer repository covering both ledger and directory.
pub struct SqliteOfficerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOfficerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl OfficerLedgerRepository for SqliteOfficerRepository<'_> {
    fn ledger_entry_exists(&self, appointment_id: AppointmentId, title: &str) -> RepoResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM officer_ledger WHERE appointment_id = ?1 AND title = ?2;",
            params![appointment_id.to_string(), title],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn append_ledger(&self, entry: &LedgerEntry) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO officer_ledger (
                uuid,
                appointment_id,
                name,
                title,
                effective_date,
                certificate_ref,
                resolution_id,
                resolution_number,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                entry.uuid.to_string(),
                entry.appointment_id.to_string(),
                entry.name.as_str(),
                entry.title.as_str(),
                entry.effective_date.as_str(),
                entry.certificate_ref.as_deref(),
                entry.resolution_id.map(|id| id.to_string()),
                entry.resolution_number.as_deref(),
                officer_status_to_db(entry.status),
            ],
        )?;

        Ok(entry.uuid)
    }

    fn list_ledger(&self, appointment_id: AppointmentId) -> RepoResult<Vec<LedgerEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                uuid,
                appointment_id,
                name,
                title,
                effective_date,
                certificate_ref,
                resolution_id,
                resolution_number,
                status
             FROM officer_ledger
             WHERE appointment_id = ?1
             ORDER BY created_at ASC, uuid ASC;",
        )?;

        let mut rows = stmt.query([appointment_id.to_string()])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_ledger_row(row)?);
        }

        Ok(entries)
    }
}

impl OfficerDirectoryRepository for SqliteOfficerRepository<'_> {
    fn upsert_directory(&self, record: &DirectoryRecord) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO officer_directory (
                uuid,
                name,
                email,
                title,
                effective_date,
                certificate_ref,
                appointed_by,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (email, title) DO UPDATE SET
                name = excluded.name,
                effective_date = excluded.effective_date,
                certificate_ref = excluded.certificate_ref,
                appointed_by = excluded.appointed_by,
                status = excluded.status,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                record.uuid.to_string(),
                record.name.as_str(),
                record.email.as_str(),
                record.title.as_str(),
                record.effective_date.as_str(),
                record.certificate_ref.as_deref(),
                record.appointed_by.map(|id| id.to_string()),
                officer_status_to_db(record.status),
            ],
        )?;

        // The conflict path keeps the original uuid, so read it back.
        let uuid_text: String = self.conn.query_row(
            "SELECT uuid FROM officer_directory WHERE email = ?1 AND title = ?2;",
            params![record.email.as_str(), record.title.as_str()],
            |row| row.get(0),
        )?;
        parse_uuid(&uuid_text, "officer_directory.uuid")
    }

    fn list_directory(&self, status: Option<OfficerStatus>) -> RepoResult<Vec<DirectoryRecord>> {
        let mut sql = String::from(
            "SELECT
                uuid,
                name,
                email,
                title,
                effective_date,
                certificate_ref,
                appointed_by,
                status
             FROM officer_directory
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(officer_status_to_db(status).to_string()));
        }

        sql.push_str(" ORDER BY email ASC, title ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_directory_row(row)?);
        }

        Ok(records)
    }
}

fn parse_ledger_row(row: &Row<'_>) -> RepoResult<LedgerEntry> {
    let uuid_text: String = row.get("uuid")?;
    let appointment_text: String = row.get("appointment_id")?;

    let status_text: String = row.get("status")?;
    let status = parse_officer_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid officer status `{status_text}` in officer_ledger.status"
        ))
    })?;

    let resolution_id = match row.get::<_, Option<String>>("resolution_id")? {
        Some(value) => Some(parse_uuid(&value, "officer_ledger.resolution_id")?),
        None => None,
    };

    Ok(LedgerEntry {
        uuid: parse_uuid(&uuid_text, "officer_ledger.uuid")?,
        appointment_id: parse_uuid(&appointment_text, "officer_ledger.appointment_id")?,
        name: row.get("name")?,
        title: row.get("title")?,
        effective_date: row.get("effective_date")?,
        certificate_ref: row.get("certificate_ref")?,
        resolution_id,
        resolution_number: row.get("resolution_number")?,
        status,
    })
}

fn parse_directory_row(row: &Row<'_>) -> RepoResult<DirectoryRecord> {
    let uuid_text: String = row.get("uuid")?;

    let status_text: String = row.get("status")?;
    let status = parse_officer_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid officer status `{status_text}` in officer_directory.status"
        ))
    })?;

    let appointed_by = match row.get::<_, Option<String>>("appointed_by")? {
        Some(value) => Some(parse_uuid(&value, "officer_directory.appointed_by")?),
        None => None,
    };

    Ok(DirectoryRecord {
        uuid: parse_uuid(&uuid_text, "officer_directory.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        title: row.get("title")?,
        effective_date: row.get("effective_date")?,
        certificate_ref: row.get("certificate_ref")?,
        appointed_by,
        status,
    })
}

pub fn officer_status_to_db(status: OfficerStatus) -> &'static str {
    match status {
        OfficerStatus::Active => "ACTIVE",
        OfficerStatus::Resigned => "RESIGNED",
        OfficerStatus::Removed => "REMOVED",
        OfficerStatus::Expired => "EXPIRED",
    }
}

pub fn parse_officer_status(value: &str) -> Option<OfficerStatus> {
    match value {
        "ACTIVE" => Some(OfficerStatus::Active),
        "RESIGNED" => Some(OfficerStatus::Resigned),
        "REMOVED" => Some(OfficerStatus::Removed),
        "EXPIRED" => Some(OfficerStatus::Expired),
        _ => None,
    }
}
