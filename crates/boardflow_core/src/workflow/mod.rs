//! Governance workflows: trigger mapping, activation saga, reconciliation
//! sweep.
//!
//! # Responsibility
//! - Orchestrate repositories, the document engine, and external
//!   collaborators into the multi-step governance flows.
//!
//! # Invariants
//! - Critical step failures abort and propagate; non-critical failures are
//!   caught, logged, and reported, never raised past their step.
//! - Every flow leaves state safe to re-run: creations are preceded by
//!   existence checks, status changes are monotonic-forward.

use crate::external::ExternalError;
use crate::model::appointment::{AppointmentId, AppointmentValidationError};
use crate::repo::RepoError;
use crate::template::engine::TemplateError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod parsing;
pub mod saga;
pub mod sweep;
pub mod triggers;

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors surfaced by workflow entry points.
#[derive(Debug)]
pub enum WorkflowError {
    AppointmentNotFound(AppointmentId),
    Validation(AppointmentValidationError),
    /// A critical saga step failed; the saga aborted with state re-runnable.
    CriticalStep {
        step: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    Repo(RepoError),
    Template(TemplateError),
    External(ExternalError),
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AppointmentNotFound(id) => write!(f, "appointment not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::CriticalStep { step, source } => {
                write!(f, "critical step `{step}` failed: {source}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::Template(err) => write!(f, "{err}"),
            Self::External(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AppointmentNotFound(_) => None,
            Self::Validation(err) => Some(err),
            Self::CriticalStep { source, .. } => Some(source.as_ref()),
            Self::Repo(err) => Some(err),
            Self::Template(err) => Some(err),
            Self::External(err) => Some(err),
        }
    }
}

impl From<AppointmentValidationError> for WorkflowError {
    fn from(value: AppointmentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for WorkflowError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<TemplateError> for WorkflowError {
    fn from(value: TemplateError) -> Self {
        Self::Template(value)
    }
}

impl From<ExternalError> for WorkflowError {
    fn from(value: ExternalError) -> Self {
        Self::External(value)
    }
}

/// Failure raised by one saga step. The driver branches on `critical`
/// uniformly instead of special-casing step names.
#[derive(Debug)]
pub struct StepFailure {
    pub critical: bool,
    pub error: Box<dyn Error + Send + Sync>,
}

impl StepFailure {
    pub fn critical(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            critical: true,
            error: error.into(),
        }
    }

    pub fn recoverable(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            critical: false,
            error: error.into(),
        }
    }
}

impl Display for StepFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Outcome of one saga step, before the driver interprets failures.
pub type StepResult<T> = Result<T, StepFailure>;

/// A non-critical step that was skipped during a saga run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStep {
    pub step: &'static str,
    pub reason: String,
}

/// Successful saga outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SagaReport {
    pub appointment_id: AppointmentId,
    /// RFC 3339 activation timestamp recorded by the finalize step.
    pub activated_at: String,
    pub skipped: Vec<SkippedStep>,
}
