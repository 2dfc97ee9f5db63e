//! Error types for the quiz engine, score store and AI flows.
//!
//! None of these are fatal: the CLI turns each of them into a visible but
//! non-blocking message.

use thiserror::Error;

use crate::model::SubjectSlug;

/// Rejected quiz session transitions. State is unchanged when these are returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The quiz has no questions, so there is nothing to advance or grade.
    #[error("no questions available")]
    NoQuestions,

    /// `advance` was called before the current question was answered.
    #[error("question {index} has not been answered yet")]
    Unanswered { index: usize },

    /// `advance` was called on a finished session; only `restart` leaves that state.
    #[error("quiz is already finished")]
    AlreadyFinished,
}

/// Errors from the score persistence port.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("score {0} is out of range (0-100)")]
    OutOfRange(u8),

    #[error("failed to encode scores: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Problems found while loading a catalog that make it unusable.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown subject in catalog: {0}")]
    UnknownSubject(String),

    #[error("{subject} question {index}: answer {answer:?} is not one of the options")]
    DanglingAnswer {
        subject: SubjectSlug,
        index: usize,
        answer: String,
    },
}

/// A single schema violation in a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON path of the offending field (e.g. `quiz[2].answer`).
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Tagged failure of an AI flow contract.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The request itself was unusable (e.g. empty topic).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The model call failed before a response was received.
    #[error("model call failed: {0}")]
    Transport(String),

    /// The model answered but the response does not match the schema.
    #[error("response failed schema validation: {}", format_violations(.0))]
    Schema(Vec<SchemaViolation>),
}

fn format_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
