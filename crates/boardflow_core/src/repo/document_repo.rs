//! Generated document storage, appointment links, and template bodies.
//!
//! # Invariants
//! - `template_bodies` is the primary body source; callers fall back to
//!   built-in bodies only when no active row exists.
//! - Linking is idempotent; re-linking an already linked pair is a no-op.

use crate::model::appointment::AppointmentId;
use crate::model::document::{DocumentId, GeneratedDocument, SigningStatus};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const DOCUMENT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    doc_type,
    body,
    signing_status,
    signers,
    appointment_id
FROM generated_documents";

/// Repository interface for generated documents.
pub trait DocumentRepository {
    fn insert_document(&self, document: &GeneratedDocument) -> RepoResult<DocumentId>;
    fn get_document(&self, id: DocumentId) -> RepoResult<Option<GeneratedDocument>>;
    fn link_to_appointment(
        &self,
        appointment_id: AppointmentId,
        document_id: DocumentId,
    ) -> RepoResult<()>;
    /// Documents linked to the appointment, oldest first.
    fn list_for_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Vec<GeneratedDocument>>;
    fn set_signing_status(&self, id: DocumentId, status: SigningStatus) -> RepoResult<()>;
    /// Active stored body for `template_id`, if any.
    fn template_body(&self, template_id: &str) -> RepoResult<Option<String>>;
    fn set_template_body(&self, template_id: &str, body: &str) -> RepoResult<()>;
}

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn insert_document(&self, document: &GeneratedDocument) -> RepoResult<DocumentId> {
        self.conn.execute(
            "INSERT INTO generated_documents (
                uuid,
                title,
                doc_type,
                body,
                signing_status,
                signers,
                appointment_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                document.uuid.to_string(),
                document.title.as_str(),
                document.doc_type.as_str(),
                document.body.as_str(),
                signing_status_to_db(document.signing_status),
                serde_json::to_string(&document.signers)?,
                document.appointment_id.map(|id| id.to_string()),
            ],
        )?;

        Ok(document.uuid)
    }

    fn get_document(&self, id: DocumentId) -> RepoResult<Option<GeneratedDocument>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOCUMENT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_document_row(row)?));
        }

        Ok(None)
    }

    fn link_to_appointment(
        &self,
        appointment_id: AppointmentId,
        document_id: DocumentId,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO appointment_documents (appointment_id, document_id)
             VALUES (?1, ?2);",
            params![appointment_id.to_string(), document_id.to_string()],
        )?;
        Ok(())
    }

    fn list_for_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> RepoResult<Vec<GeneratedDocument>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DOCUMENT_SELECT_SQL}
             WHERE uuid IN (
                SELECT document_id FROM appointment_documents WHERE appointment_id = ?1
             )
             ORDER BY created_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([appointment_id.to_string()])?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }

        Ok(documents)
    }

    fn set_signing_status(&self, id: DocumentId, status: SigningStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE generated_documents SET signing_status = ?1 WHERE uuid = ?2;",
            params![signing_status_to_db(status), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "generated document",
                id: id.to_string(),
            });
        }

        Ok(())
    }

    fn template_body(&self, template_id: &str) -> RepoResult<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM template_bodies WHERE template_id = ?1 AND is_active = 1;",
                [template_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body)
    }

    fn set_template_body(&self, template_id: &str, body: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO template_bodies (template_id, body, is_active)
             VALUES (?1, ?2, 1)
             ON CONFLICT (template_id) DO UPDATE SET body = excluded.body, is_active = 1;",
            params![template_id, body],
        )?;
        Ok(())
    }
}

fn parse_document_row(row: &Row<'_>) -> RepoResult<GeneratedDocument> {
    let uuid_text: String = row.get("uuid")?;

    let status_text: String = row.get("signing_status")?;
    let signing_status = parse_signing_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid signing status `{status_text}` in generated_documents.signing_status"
        ))
    })?;

    let signers_text: String = row.get("signers")?;

    let appointment_id = match row.get::<_, Option<String>>("appointment_id")? {
        Some(value) => Some(parse_uuid(&value, "generated_documents.appointment_id")?),
        None => None,
    };

    Ok(GeneratedDocument {
        uuid: parse_uuid(&uuid_text, "generated_documents.uuid")?,
        title: row.get("title")?,
        doc_type: row.get("doc_type")?,
        body: row.get("body")?,
        signing_status,
        signers: serde_json::from_str(&signers_text)?,
        appointment_id,
    })
}

pub fn signing_status_to_db(status: SigningStatus) -> &'static str {
    match status {
        SigningStatus::Pending => "pending",
        SigningStatus::Signed => "signed",
    }
}

pub fn parse_signing_status(value: &str) -> Option<SigningStatus> {
    match value {
        "pending" => Some(SigningStatus::Pending),
        "signed" => Some(SigningStatus::Signed),
        _ => None,
    }
}
