//! Timeline and governance log repositories. Both feeds are append-only.

use crate::model::appointment::AppointmentId;
use crate::model::timeline::{GovernanceLogEntry, TimelineEvent};
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Repository interface for the per-appointment timeline.
pub trait TimelineRepository {
    fn append_event(&self, event: &TimelineEvent) -> RepoResult<Uuid>;
    /// Events for the appointment in insertion order.
    fn list_for_appointment(&self, appointment_id: AppointmentId)
        -> RepoResult<Vec<TimelineEvent>>;
}

/// Repository interface for the organization-wide governance log.
pub trait GovernanceLogRepository {
    fn append_log(&self, entry: &GovernanceLogEntry) -> RepoResult<Uuid>;
    fn list_log(&self) -> RepoResult<Vec<GovernanceLogEntry>>;
}

/// SQLite-backed timeline and governance log repository.
pub struct SqliteTimelineRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTimelineRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TimelineRepository for SqliteTimelineRepository<'_> {
    fn append_event(&self, event: &TimelineEvent) -> RepoResult<Uuid> {
        let metadata = match &event.metadata {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        self.conn.execute(
            "INSERT INTO timeline_events (
                uuid,
                appointment_id,
                event_type,
                description,
                metadata,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                event.uuid.to_string(),
                event.appointment_id.to_string(),
                event.event_type.as_str(),
                event.description.as_str(),
                metadata,
                event.created_at,
            ],
        )?;

        Ok(event.uuid)
    }

    fn list_for_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Vec<TimelineEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, appointment_id, event_type, description, metadata, created_at
             FROM timeline_events
             WHERE appointment_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;

        let mut rows = stmt.query([appointment_id.to_string()])?;
        let mut events = Vec::new();

        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        Ok(events)
    }
}

impl GovernanceLogRepository for SqliteTimelineRepository<'_> {
    fn append_log(&self, entry: &GovernanceLogEntry) -> RepoResult<Uuid> {
        let data = match &entry.data {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        self.conn.execute(
            "INSERT INTO governance_log (
                uuid,
                action,
                entity_type,
                entity_id,
                description,
                data,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                entry.uuid.to_string(),
                entry.action.as_str(),
                entry.entity_type.as_str(),
                entry.entity_id.as_str(),
                entry.description.as_str(),
                data,
                entry.created_at,
            ],
        )?;

        Ok(entry.uuid)
    }

    fn list_log(&self) -> RepoResult<Vec<GovernanceLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, action, entity_type, entity_id, description, data, created_at
             FROM governance_log
             ORDER BY created_at ASC, rowid ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_log_row(row)?);
        }

        Ok(entries)
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<TimelineEvent> {
    let uuid_text: String = row.get("uuid")?;
    let appointment_text: String = row.get("appointment_id")?;

    let metadata = match row.get::<_, Option<String>>("metadata")? {
        Some(text) => Some(serde_json::from_str(&text)?),
        None => None,
    };

    Ok(TimelineEvent {
        uuid: parse_uuid(&uuid_text, "timeline_events.uuid")?,
        appointment_id: parse_uuid(&appointment_text, "timeline_events.appointment_id")?,
        event_type: row.get("event_type")?,
        description: row.get("description")?,
        metadata,
        created_at: row.get("created_at")?,
    })
}

fn parse_log_row(row: &Row<'_>) -> RepoResult<GovernanceLogEntry> {
    let uuid_text: String = row.get("uuid")?;

    let data = match row.get::<_, Option<String>>("data")? {
        Some(text) => Some(serde_json::from_str(&text)?),
        None => None,
    };

    Ok(GovernanceLogEntry {
        uuid: parse_uuid(&uuid_text, "governance_log.uuid")?,
        action: row.get("action")?,
        entity_type: row.get("entity_type")?,
        entity_id: row.get("entity_id")?,
        description: row.get("description")?,
        data,
        created_at: row.get("created_at")?,
    })
}
