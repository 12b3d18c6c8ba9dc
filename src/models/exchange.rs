use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ExchangeKind {
    Question,
    Answer,
    Error,
}

/// One turn of the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub kind: ExchangeKind,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Exchange {
    fn new(kind: ExchangeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn question(text: impl Into<String>) -> Self {
        Self::new(ExchangeKind::Question, text)
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self::new(ExchangeKind::Answer, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(ExchangeKind::Error, text)
    }
}
