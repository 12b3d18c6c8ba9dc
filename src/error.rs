//! Error types for the document analyzer.
//!
//! Every variant's `Display` is the message shown to the user, so the shell can
//! print errors as-is.

use thiserror::Error;

use crate::session::PhaseKind;

const GENERIC_PROTOCOL_MESSAGE: &str = "The expected response was not received from the API.";

/// Input rejected before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a valid PDF file.")]
    NotPdf { name: String },

    #[error("Please provide both a PDF file and a question.")]
    EmptyQuestion,

    #[error("Please wait for the current answer before asking another question.")]
    QuestionPending,

    #[error("Please enter your feedback before submitting.")]
    EmptyFeedback,

    #[error("Your feedback is still being analyzed.")]
    FeedbackPending,
}

/// Errors returned by the session controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The event is not allowed in the current phase.
    #[error("Cannot {event} in the {phase} phase.")]
    InvalidTransition {
        phase: PhaseKind,
        event: &'static str,
    },

    /// The feedback round-trip failed; the session itself is unchanged.
    #[error("{0}")]
    Feedback(String),

    /// The session was replaced while a feedback round-trip was in flight.
    #[error("The session changed before the feedback analysis finished.")]
    Superseded,
}

impl SessionError {
    pub fn invalid(phase: PhaseKind, event: &'static str) -> Self {
        Self::InvalidTransition { phase, event }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Failure of a round-trip against one of the remote services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service answered successfully but reported an error field.
    #[error("Error: {0}")]
    Reported(String),

    /// Non-success HTTP status. `detail` is the service-provided message, if any.
    #[error("{}", describe_status(.reason, .detail))]
    Status {
        status: u16,
        reason: String,
        detail: Option<String>,
    },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// The response had none of the expected fields.
    #[error("{}", GENERIC_PROTOCOL_MESSAGE)]
    Protocol,
}

impl ServiceError {
    /// Text recorded as the `Error` exchange of a failed question round-trip.
    pub fn question_message(&self) -> String {
        match self {
            Self::Status { .. } | Self::Transport(_) => format!("An error occurred: {self}"),
            Self::Reported(_) | Self::Protocol => self.to_string(),
        }
    }

    /// Text surfaced when a feedback round-trip fails.
    pub fn feedback_message(&self) -> String {
        format!("An error occurred while analyzing feedback: {self}")
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Protocol
        } else {
            Self::Transport(err.to_string())
        }
    }
}

fn describe_status(reason: &str, detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.trim().is_empty() => detail.clone(),
        _ => format!("Server Error: {reason}"),
    }
}

/// The classifier response carried nothing the verdict engine can use.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerdictError {
    #[error("{}", GENERIC_PROTOCOL_MESSAGE)]
    EmptyClassification,
}
