//! Pipeline result types
//!
//! [`PipelineResult`] is the caller-facing payload: either everything the host
//! needs to persist a statement, or a failure classified by stage and kind.

use super::error::{ErrorKind, ImportError, Stage};
use super::identity::ImportIdentity;
use super::statement::{DocumentMeta, ParsedStatement};
use super::validation::ValidationResult;
use serde::Serialize;

/// Everything produced by a successful pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub document: DocumentMeta,
    pub statement: ParsedStatement,
    pub validation: ValidationResult,
    pub identity: ImportIdentity,
    /// The identity was already known to the caller's store
    pub is_duplicate: bool,
}

/// A classified pipeline failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineFailure {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl PipelineFailure {
    pub fn new(stage: Stage, error: &ImportError) -> Self {
        PipelineFailure {
            stage,
            kind: error.kind(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

/// Tagged outcome of one pipeline invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResult {
    Success(Box<ImportOutcome>),
    Failure(PipelineFailure),
}

impl PipelineResult {
    pub fn failure(stage: Stage, error: &ImportError) -> Self {
        PipelineResult::Failure(PipelineFailure::new(stage, error))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success(_))
    }

    pub fn outcome(&self) -> Option<&ImportOutcome> {
        match self {
            PipelineResult::Success(outcome) => Some(outcome),
            PipelineResult::Failure(_) => None,
        }
    }

    pub fn failure_details(&self) -> Option<&PipelineFailure> {
        match self {
            PipelineResult::Success(_) => None,
            PipelineResult::Failure(failure) => Some(failure),
        }
    }
}
