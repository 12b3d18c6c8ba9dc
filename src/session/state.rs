use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, SessionError, ValidationError};
use crate::feedback::{FeedbackText, Verdict};
use crate::models::{Document, DocumentInfo, Exchange};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PhaseKind {
    NoFile,
    FileSelected,
    Active,
    Ended,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::NoFile => "NoFile",
            PhaseKind::FileSelected => "FileSelected",
            PhaseKind::Active => "Active",
            PhaseKind::Ended => "Ended",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The question whose round-trip is in flight.
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub round_id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackState {
    pub last_text: Option<String>,
    pub pending: bool,
    pub verdict: Option<Verdict>,
    pub error: Option<String>,
}

/// Session phase together with the data that exists in that phase. A
/// document is only reachable once chosen, a pending question only while
/// active, and feedback only once ended.
#[derive(Debug, Clone)]
pub enum Phase {
    NoFile,
    FileSelected {
        document: Document,
    },
    Active {
        document: Document,
        transcript: Vec<Exchange>,
        pending: Option<PendingQuestion>,
    },
    Ended {
        document: Document,
        transcript: Vec<Exchange>,
        feedback: FeedbackState,
    },
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::NoFile => PhaseKind::NoFile,
            Phase::FileSelected { .. } => PhaseKind::FileSelected,
            Phase::Active { .. } => PhaseKind::Active,
            Phase::Ended { .. } => PhaseKind::Ended,
        }
    }
}

/// Everything a question round-trip needs once the state lock is released.
#[derive(Debug, Clone)]
pub struct QuestionRound {
    pub session_id: String,
    pub round_id: Uuid,
    pub document: Document,
    pub question: String,
}

#[derive(Debug, Clone)]
pub struct FeedbackRound {
    pub session_id: String,
    pub text: FeedbackText,
}

/// What happened to a finished question round-trip.
#[derive(Debug, Clone)]
pub enum RoundOutcome {
    Appended(Exchange),
    /// The session ended or was replaced before the answer arrived.
    Discarded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Option<String>,
    pub phase: PhaseKind,
    pub document: Option<DocumentInfo>,
    pub transcript: Vec<Exchange>,
    pub pending_question: Option<String>,
    pub feedback: Option<FeedbackState>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: Option<String>,
    pub phase: Phase,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session_id: None,
            phase: Phase::NoFile,
            started_at: None,
            ended_at: None,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn document(&self) -> Option<&Document> {
        match &self.phase {
            Phase::NoFile => None,
            Phase::FileSelected { document }
            | Phase::Active { document, .. }
            | Phase::Ended { document, .. } => Some(document),
        }
    }

    pub fn transcript(&self) -> &[Exchange] {
        match &self.phase {
            Phase::Active { transcript, .. } | Phase::Ended { transcript, .. } => transcript,
            Phase::NoFile | Phase::FileSelected { .. } => &[],
        }
    }

    pub fn feedback(&self) -> Option<&FeedbackState> {
        match &self.phase {
            Phase::Ended { feedback, .. } => Some(feedback),
            _ => None,
        }
    }

    /// Chooses a new document, which starts a new session from any phase.
    /// The old transcript is dropped and an answer still in flight for it is
    /// discarded on arrival. A non-PDF leaves everything untouched.
    pub fn select_document(&mut self, document: Document) -> Result<(), SessionError> {
        if !document.is_pdf() {
            return Err(ValidationError::NotPdf {
                name: document.name().to_string(),
            }
            .into());
        }

        *self = Self {
            session_id: Some(Uuid::new_v4().to_string()),
            phase: Phase::FileSelected { document },
            started_at: None,
            ended_at: None,
        };
        Ok(())
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        match std::mem::replace(&mut self.phase, Phase::NoFile) {
            Phase::FileSelected { document } => {
                self.phase = Phase::Active {
                    document,
                    transcript: Vec::new(),
                    pending: None,
                };
                self.started_at = Some(now);
                self.ended_at = None;
                Ok(())
            }
            other => {
                let kind = other.kind();
                self.phase = other;
                Err(SessionError::invalid(kind, "start a session"))
            }
        }
    }

    /// Appends the question and marks it pending. The caller issues the
    /// request with the returned round.
    pub fn begin_question(&mut self, question: &str) -> Result<QuestionRound, SessionError> {
        let kind = self.kind();
        let session_id = self.session_id.clone().unwrap_or_default();

        let Phase::Active {
            document,
            transcript,
            pending,
        } = &mut self.phase
        else {
            return Err(SessionError::invalid(kind, "ask a question"));
        };

        if question.trim().is_empty() {
            return Err(SessionError::from(ValidationError::EmptyQuestion));
        }
        if pending.is_some() {
            return Err(SessionError::from(ValidationError::QuestionPending));
        }

        let round_id = Uuid::new_v4();
        transcript.push(Exchange::question(question));
        *pending = Some(PendingQuestion {
            round_id,
            text: question.to_string(),
        });

        Ok(QuestionRound {
            session_id,
            round_id,
            document: document.clone(),
            question: question.to_string(),
        })
    }

    /// Applies the outcome of a question round-trip. Outcomes for a session
    /// that has ended or been replaced are dropped.
    pub fn complete_question(
        &mut self,
        session_id: &str,
        round_id: Uuid,
        outcome: Result<String, ServiceError>,
    ) -> RoundOutcome {
        if self.session_id.as_deref() != Some(session_id) {
            return RoundOutcome::Discarded;
        }

        let Phase::Active {
            transcript,
            pending,
            ..
        } = &mut self.phase
        else {
            return RoundOutcome::Discarded;
        };

        if pending.as_ref().map(|p| p.round_id) != Some(round_id) {
            return RoundOutcome::Discarded;
        }

        let exchange = match outcome {
            Ok(answer) => Exchange::answer(answer),
            Err(err) => Exchange::error(err.question_message()),
        };
        transcript.push(exchange.clone());
        *pending = None;

        RoundOutcome::Appended(exchange)
    }

    /// Freezes the transcript and opens feedback collection. A question still
    /// in flight is abandoned; its answer will be discarded.
    pub fn end(&mut self, now: DateTime<Utc>) -> Result<Option<PendingQuestion>, SessionError> {
        match std::mem::replace(&mut self.phase, Phase::NoFile) {
            Phase::Active {
                document,
                transcript,
                pending,
            } => {
                self.phase = Phase::Ended {
                    document,
                    transcript,
                    feedback: FeedbackState::default(),
                };
                self.ended_at = Some(now);
                Ok(pending)
            }
            other => {
                let kind = other.kind();
                self.phase = other;
                Err(SessionError::invalid(kind, "end the session"))
            }
        }
    }

    /// Validates feedback and marks it pending. The previous verdict and error
    /// are cleared so a new submission never shows stale results.
    pub fn begin_feedback(&mut self, text: &str) -> Result<FeedbackRound, SessionError> {
        let kind = self.kind();
        let session_id = self.session_id.clone().unwrap_or_default();

        let Phase::Ended { feedback, .. } = &mut self.phase else {
            return Err(SessionError::invalid(kind, "submit feedback"));
        };

        let text = FeedbackText::new(text)?;
        if feedback.pending {
            return Err(SessionError::from(ValidationError::FeedbackPending));
        }

        *feedback = FeedbackState {
            last_text: Some(text.as_str().to_string()),
            pending: true,
            verdict: None,
            error: None,
        };

        Ok(FeedbackRound { session_id, text })
    }

    /// Records the feedback outcome. Returns false when the session was
    /// replaced in the meantime.
    pub fn complete_feedback(
        &mut self,
        session_id: &str,
        outcome: Result<Verdict, String>,
    ) -> bool {
        if self.session_id.as_deref() != Some(session_id) {
            return false;
        }
        let Phase::Ended { feedback, .. } = &mut self.phase else {
            return false;
        };

        feedback.pending = false;
        match outcome {
            Ok(verdict) => {
                feedback.verdict = Some(verdict);
                feedback.error = None;
            }
            Err(message) => {
                feedback.verdict = None;
                feedback.error = Some(message);
            }
        }
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let pending_question = match &self.phase {
            Phase::Active {
                pending: Some(pending),
                ..
            } => Some(pending.text.clone()),
            _ => None,
        };

        SessionSnapshot {
            session_id: self.session_id.clone(),
            phase: self.kind(),
            document: self.document().map(Document::info),
            transcript: self.transcript().to_vec(),
            pending_question,
            feedback: self.feedback().cloned(),
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExchangeKind;

    fn pdf() -> Document {
        Document::new("paper.pdf", b"%PDF-1.7".to_vec())
    }

    fn active_state() -> SessionState {
        let mut state = SessionState::new();
        state.select_document(pdf()).unwrap();
        state.start(Utc::now()).unwrap();
        state
    }

    #[test]
    fn starts_with_no_file() {
        let state = SessionState::new();
        assert_eq!(state.kind(), PhaseKind::NoFile);
        assert!(state.document().is_none());
        assert!(state.transcript().is_empty());
        assert!(state.session_id.is_none());
    }

    #[test]
    fn non_pdf_is_rejected_in_every_phase() {
        let mut states = vec![SessionState::new()];

        let mut selected = SessionState::new();
        selected.select_document(pdf()).unwrap();
        states.push(selected);

        states.push(active_state());

        let mut ended = active_state();
        ended.end(Utc::now()).unwrap();
        states.push(ended);

        for mut state in states {
            let before = state.kind();
            let session_before = state.session_id.clone();
            let err = state
                .select_document(Document::new("notes.docx", Vec::new()))
                .unwrap_err();
            assert!(err.is_validation());
            assert_eq!(state.kind(), before);
            assert_eq!(state.session_id, session_before);
        }
    }

    #[test]
    fn selecting_a_pdf_assigns_a_new_session() {
        let mut state = SessionState::new();
        state.select_document(pdf()).unwrap();
        let first = state.session_id.clone().unwrap();

        state
            .select_document(Document::new("other.pdf", Vec::new()))
            .unwrap();
        assert_eq!(state.kind(), PhaseKind::FileSelected);
        assert_eq!(state.document().unwrap().name(), "other.pdf");
        assert_ne!(state.session_id.clone().unwrap(), first);
    }

    #[test]
    fn selecting_a_file_while_active_starts_over() {
        let mut state = active_state();
        let old_session = state.session_id.clone();
        let round = state.begin_question("q").unwrap();

        state
            .select_document(Document::new("b.pdf", Vec::new()))
            .unwrap();
        assert_eq!(state.kind(), PhaseKind::FileSelected);
        assert_eq!(state.document().unwrap().name(), "b.pdf");
        assert!(state.transcript().is_empty());
        assert!(state.started_at.is_none());
        assert_ne!(state.session_id, old_session);

        let outcome = state.complete_question(&round.session_id, round.round_id, Ok("a".into()));
        assert!(matches!(outcome, RoundOutcome::Discarded));
        assert!(state.transcript().is_empty());
    }

    #[test]
    fn start_requires_a_selected_file() {
        let mut state = SessionState::new();
        assert!(state.start(Utc::now()).is_err());
        assert_eq!(state.kind(), PhaseKind::NoFile);

        let mut active = active_state();
        assert!(active.start(Utc::now()).is_err());
        assert_eq!(active.kind(), PhaseKind::Active);
    }

    #[test]
    fn question_is_appended_before_the_answer() {
        let mut state = active_state();
        let round = state.begin_question("What is this about?").unwrap();

        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.transcript()[0].kind, ExchangeKind::Question);
        assert_eq!(
            state.snapshot().pending_question.as_deref(),
            Some("What is this about?")
        );

        let outcome =
            state.complete_question(&round.session_id, round.round_id, Ok("Physics".into()));
        assert!(matches!(outcome, RoundOutcome::Appended(_)));
        let kinds: Vec<_> = state.transcript().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ExchangeKind::Question, ExchangeKind::Answer]);
        assert!(state.snapshot().pending_question.is_none());
    }

    #[test]
    fn second_question_while_pending_leaves_transcript_alone() {
        let mut state = active_state();
        state.begin_question("first").unwrap();

        let err = state.begin_question("second").unwrap_err();
        assert_eq!(err, SessionError::from(ValidationError::QuestionPending));
        assert_eq!(state.transcript().len(), 1);
    }

    #[test]
    fn blank_question_is_rejected() {
        let mut state = active_state();
        let err = state.begin_question("   ").unwrap_err();
        assert_eq!(err, SessionError::from(ValidationError::EmptyQuestion));
        assert!(state.transcript().is_empty());
    }

    #[test]
    fn failed_round_becomes_an_error_exchange() {
        let mut state = active_state();
        let round = state.begin_question("q").unwrap();
        state.complete_question(
            &round.session_id,
            round.round_id,
            Err(ServiceError::Transport("connection refused".into())),
        );

        let last = state.transcript().last().unwrap();
        assert_eq!(last.kind, ExchangeKind::Error);
        assert_eq!(last.text, "An error occurred: connection refused");
        assert_eq!(state.kind(), PhaseKind::Active);
        assert!(state.begin_question("retry").is_ok());
    }

    #[test]
    fn late_answer_after_end_is_discarded() {
        let mut state = active_state();
        let round = state.begin_question("q").unwrap();
        let abandoned = state.end(Utc::now()).unwrap();
        assert_eq!(abandoned.map(|p| p.round_id), Some(round.round_id));

        let outcome = state.complete_question(&round.session_id, round.round_id, Ok("a".into()));
        assert!(matches!(outcome, RoundOutcome::Discarded));
        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.kind(), PhaseKind::Ended);
    }

    #[test]
    fn ending_without_exchanges_opens_feedback() {
        let mut state = active_state();
        state.end(Utc::now()).unwrap();

        assert_eq!(state.kind(), PhaseKind::Ended);
        assert!(state.transcript().is_empty());
        assert_eq!(state.feedback(), Some(&FeedbackState::default()));
        assert!(state.snapshot().ended_at.is_some());
    }

    #[test]
    fn end_is_only_valid_while_active() {
        let mut state = SessionState::new();
        assert!(state.end(Utc::now()).is_err());
        state.select_document(pdf()).unwrap();
        assert!(state.end(Utc::now()).is_err());
        assert_eq!(state.kind(), PhaseKind::FileSelected);
    }

    #[test]
    fn feedback_is_only_accepted_once_ended() {
        let mut state = active_state();
        let err = state.begin_feedback("great").unwrap_err();
        assert_eq!(err, SessionError::invalid(PhaseKind::Active, "submit feedback"));

        state.end(Utc::now()).unwrap();
        assert_eq!(
            state.begin_feedback(" \n").unwrap_err(),
            SessionError::from(ValidationError::EmptyFeedback)
        );
        let round = state.begin_feedback("great").unwrap();
        assert_eq!(round.text.as_str(), "great");
        assert!(state.feedback().unwrap().pending);
        assert_eq!(
            state.begin_feedback("again").unwrap_err(),
            SessionError::from(ValidationError::FeedbackPending)
        );
    }

    #[test]
    fn new_file_after_end_discards_transcript_and_feedback() {
        let mut state = active_state();
        let round = state.begin_question("q").unwrap();
        state.complete_question(&round.session_id, round.round_id, Ok("a".into()));
        state.end(Utc::now()).unwrap();
        let feedback = state.begin_feedback("thanks").unwrap();

        state
            .select_document(Document::new("next.pdf", Vec::new()))
            .unwrap();
        assert_eq!(state.kind(), PhaseKind::FileSelected);
        assert!(state.transcript().is_empty());
        assert!(state.feedback().is_none());
        assert!(!state.complete_feedback(&feedback.session_id, Err("late".into())));
    }
}
