//! Board resolution repository and per-year numbering.
//!
//! # Invariants
//! - `resolution_number` is unique; the sequence for a year is derived from
//!   the count of existing numbers carrying that year prefix.
//! - Status only moves forward from PENDING_VOTE; adoption and rejection are
//!   recorded here but decided by the voting surface.

use crate::model::appointment::ResolutionId;
use crate::model::resolution::{format_resolution_number, BoardResolution, ResolutionStatus};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const RESOLUTION_SELECT_SQL: &str = "SELECT
    uuid,
    resolution_number,
    title,
    description,
    resolution_type,
    status,
    meeting_date,
    effective_date,
    metadata
FROM board_resolutions";

/// Repository interface for board resolutions.
pub trait ResolutionRepository {
    fn create_resolution(&self, resolution: &BoardResolution) -> RepoResult<ResolutionId>;
    fn get_resolution(&self, id: ResolutionId) -> RepoResult<Option<BoardResolution>>;
    /// Number of resolutions already carrying the `{year}-` prefix.
    fn count_for_year(&self, year: i32) -> RepoResult<u32>;
    /// Allocates the next `{year}-{sequence}` number.
    fn next_resolution_number(&self, year: i32) -> RepoResult<String>;
    fn set_resolution_status(&self, id: ResolutionId, status: ResolutionStatus) -> RepoResult<()>;
}

/// SQLite-backed resolution repository.
pub struct SqliteResolutionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResolutionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ResolutionRepository for SqliteResolutionRepository<'_> {
    fn create_resolution(&self, resolution: &BoardResolution) -> RepoResult<ResolutionId> {
        let metadata = match &resolution.metadata {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        self.conn.execute(
            "INSERT INTO board_resolutions (
                uuid,
                resolution_number,
                title,
                description,
                resolution_type,
                status,
                meeting_date,
                effective_date,
                metadata
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                resolution.uuid.to_string(),
                resolution.resolution_number.as_str(),
                resolution.title.as_str(),
                resolution.description.as_str(),
                resolution.resolution_type.as_str(),
                resolution_status_to_db(resolution.status),
                resolution.meeting_date.as_deref(),
                resolution.effective_date.as_deref(),
                metadata,
            ],
        )?;

        Ok(resolution.uuid)
    }

    fn get_resolution(&self, id: ResolutionId) -> RepoResult<Option<BoardResolution>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOLUTION_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_resolution_row(row)?));
        }

        Ok(None)
    }

    fn count_for_year(&self, year: i32) -> RepoResult<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM board_resolutions WHERE resolution_number LIKE ?1;",
            [format!("{year}-%")],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    fn next_resolution_number(&self, year: i32) -> RepoResult<String> {
        let count = self.count_for_year(year)?;
        Ok(format_resolution_number(year, count + 1))
    }

    fn set_resolution_status(&self, id: ResolutionId, status: ResolutionStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE board_resolutions SET status = ?1 WHERE uuid = ?2;",
            params![resolution_status_to_db(status), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "board resolution",
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

fn parse_resolution_row(row: &Row<'_>) -> RepoResult<BoardResolution> {
    let uuid_text: String = row.get("uuid")?;

    let status_text: String = row.get("status")?;
    let status = parse_resolution_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in board_resolutions.status"
        ))
    })?;

    let metadata = match row.get::<_, Option<String>>("metadata")? {
        Some(text) => Some(serde_json::from_str(&text)?),
        None => None,
    };

    Ok(BoardResolution {
        uuid: parse_uuid(&uuid_text, "board_resolutions.uuid")?,
        resolution_number: row.get("resolution_number")?,
        title: row.get("title")?,
        description: row.get("description")?,
        resolution_type: row.get("resolution_type")?,
        status,
        meeting_date: row.get("meeting_date")?,
        effective_date: row.get("effective_date")?,
        metadata,
    })
}

pub fn resolution_status_to_db(status: ResolutionStatus) -> &'static str {
    match status {
        ResolutionStatus::PendingVote => "PENDING_VOTE",
        ResolutionStatus::Adopted => "ADOPTED",
        ResolutionStatus::Rejected => "REJECTED",
    }
}

pub fn parse_resolution_status(value: &str) -> Option<ResolutionStatus> {
    match value {
        "PENDING_VOTE" => Some(ResolutionStatus::PendingVote),
        "ADOPTED" => Some(ResolutionStatus::Adopted),
        "REJECTED" => Some(ResolutionStatus::Rejected),
        _ => None,
    }
}
