//! Document generation engine: interpolation, body loading, persistence.
//!
//! # Responsibility
//! - Render catalog templates against a context mapping.
//! - Persist rendered bodies as pending generated documents.
//!
//! # Invariants
//! - Body loading prefers the primary `template_bodies` store and falls back
//!   to the built-in body; both missing is `BodyUnavailable`.
//! - Interpolation is lenient: unmatched placeholders stay intact so partial
//!   drafts remain usable.

use crate::model::appointment::AppointmentId;
use crate::model::document::{DocumentId, GeneratedDocument};
use crate::repo::document_repo::{DocumentRepository, SqliteDocumentRepository};
use crate::repo::RepoError;
use crate::template::builtin;
use crate::template::registry::{lookup, TemplateId, TemplateMeta};
use log::{debug, warn};
use regex::{NoExpand, Regex};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Placeholder values for one render call.
pub type TemplateContext = BTreeMap<String, serde_json::Value>;

pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors raised while rendering or persisting documents.
#[derive(Debug)]
pub enum TemplateError {
    /// The caller-supplied id string names no catalog template.
    UnknownTemplate(String),
    /// Neither the primary store nor the built-in source has a body.
    BodyUnavailable(TemplateId),
    Repo(RepoError),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTemplate(id) => write!(f, "template not found: {id}"),
            Self::BodyUnavailable(id) => {
                write!(f, "no body available for template: {}", id.as_str())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TemplateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TemplateError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Replaces every whitespace-tolerant `{{key}}` with the stringified context
/// value. Null values render empty; placeholders without a context entry are
/// left intact.
pub fn interpolate(body: &str, context: &TemplateContext) -> String {
    let mut output = body.to_string();
    for (key, value) in context {
        let pattern = format!(r"\{{\{{\s*{}\s*\}}\}}", regex::escape(key));
        let regex = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(err) => {
                warn!("event=interpolate module=template status=skip key={key} error={err}");
                continue;
            }
        };
        // NoExpand keeps `$` in values literal instead of expanding captures.
        let replacement = stringify(value);
        output = regex
            .replace_all(&output, NoExpand(replacement.as_str()))
            .into_owned();
    }
    output
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Renders templates and persists generated documents over one connection.
pub struct DocumentEngine<'conn> {
    conn: &'conn Connection,
}

impl<'conn> DocumentEngine<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Loads the body for `id`, preferring the primary store.
    pub fn load_body(&self, id: TemplateId) -> TemplateResult<String> {
        let documents = SqliteDocumentRepository::new(self.conn);
        match documents.template_body(id.as_str()) {
            Ok(Some(body)) => return Ok(body),
            Ok(None) => {}
            Err(err) => {
                // Primary store failure falls back rather than aborting.
                warn!(
                    "event=template_body module=template status=error template={} error={err}",
                    id.as_str()
                );
            }
        }

        builtin::body(id)
            .map(str::to_string)
            .ok_or(TemplateError::BodyUnavailable(id))
    }

    /// Renders `id` against `context`.
    pub fn render(&self, id: TemplateId, context: &TemplateContext) -> TemplateResult<String> {
        let body = self.load_body(id)?;
        debug!(
            "event=template_render module=template status=ok template={} keys={}",
            id.as_str(),
            context.len()
        );
        Ok(interpolate(&body, context))
    }

    /// Persists a rendered body as a pending, unsigned document, linking it
    /// to `appointment_id` when one is given.
    pub fn persist(
        &self,
        appointment_id: Option<AppointmentId>,
        meta: &TemplateMeta,
        body: String,
    ) -> TemplateResult<DocumentId> {
        let documents = SqliteDocumentRepository::new(self.conn);

        let mut document = GeneratedDocument::new(meta.title, meta.id.doc_type(), body);
        document.appointment_id = appointment_id;

        let document_id = documents.insert_document(&document)?;
        if let Some(appointment_id) = appointment_id {
            documents.link_to_appointment(appointment_id, document_id)?;
        }

        debug!(
            "event=document_persisted module=template status=ok template={} document={document_id}",
            meta.id.as_str()
        );
        Ok(document_id)
    }

    /// Convenience wrapper for the service surface: render by id string.
    pub fn render_by_name(&self, id: &str, context: &TemplateContext) -> TemplateResult<String> {
        let template_id =
            TemplateId::parse(id).ok_or_else(|| TemplateError::UnknownTemplate(id.to_string()))?;
        let _ = lookup(template_id);
        self.render(template_id, context)
    }
}

#[cfg(test)]
mod tests {
    use super::{interpolate, TemplateContext};
    use serde_json::json;

    fn context(entries: &[(&str, serde_json::Value)]) -> TemplateContext {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn replaces_whitespace_tolerant_placeholders() {
        let ctx = context(&[("company_name", json!("Lakeshore Provisions, Inc."))]);
        assert_eq!(
            interpolate("<p>{{ company_name }}</p>", &ctx),
            "<p>Lakeshore Provisions, Inc.</p>"
        );
        assert_eq!(
            interpolate("<p>{{company_name}}</p>", &ctx),
            "<p>Lakeshore Provisions, Inc.</p>"
        );
    }

    #[test]
    fn null_values_render_empty() {
        let ctx = context(&[("officer_email", serde_json::Value::Null)]);
        assert_eq!(interpolate("<{{officer_email}}>", &ctx), "<>");
    }

    #[test]
    fn unmatched_placeholders_are_left_intact() {
        let ctx = context(&[("known", json!("x"))]);
        assert_eq!(
            interpolate("{{known}} and {{unknown}}", &ctx),
            "x and {{unknown}}"
        );
    }

    #[test]
    fn non_string_values_are_stringified() {
        let ctx = context(&[("shares", json!(500000)), ("active", json!(true))]);
        assert_eq!(
            interpolate("{{shares}} shares, active={{active}}", &ctx),
            "500000 shares, active=true"
        );
    }
}
