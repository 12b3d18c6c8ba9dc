use serde::Serialize;

use crate::feedback::Verdict;
use crate::models::Exchange;

use super::SessionSnapshot;

/// Notifications for the display layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    #[serde(rename_all = "camelCase")]
    PhaseChanged { snapshot: SessionSnapshot },

    #[serde(rename_all = "camelCase")]
    ExchangeAppended {
        session_id: String,
        exchange: Exchange,
    },

    /// An answer arrived after its session ended or was replaced.
    #[serde(rename_all = "camelCase")]
    AnswerDiscarded { session_id: String },

    #[serde(rename_all = "camelCase")]
    ValidationFailed { message: String },

    #[serde(rename_all = "camelCase")]
    FeedbackPending { session_id: String },

    #[serde(rename_all = "camelCase")]
    VerdictReady {
        session_id: String,
        verdict: Verdict,
    },

    #[serde(rename_all = "camelCase")]
    FeedbackFailed { session_id: String, message: String },
}
