use std::sync::Arc;

use chrono::Utc;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};

use crate::{
    error::{ServiceError, SessionError},
    feedback::{compute_verdict, FeedbackText, Verdict, VerdictConfig},
    log_error, log_info, log_warn,
    models::{ClassifierResult, Document},
    services::{FeedbackClassifier, QuestionAnswering},
};

use super::{
    state::{QuestionRound, RoundOutcome},
    SessionEvent, SessionSnapshot, SessionState,
};

const ENABLE_LOGS: bool = true;
const EVENT_CAPACITY: usize = 64;

/// Owns the session and drives it through user intents and service outcomes.
///
/// At most one question round-trip is in flight; its task handle sits in a
/// single slot and the session's pending marker rejects further questions
/// until it resolves.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    qa: Arc<dyn QuestionAnswering>,
    classifier: Arc<dyn FeedbackClassifier>,
    verdict_config: VerdictConfig,
    in_flight: Arc<Mutex<Option<JoinHandle<()>>>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(
        qa: Arc<dyn QuestionAnswering>,
        classifier: Arc<dyn FeedbackClassifier>,
        verdict_config: VerdictConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            qa,
            classifier,
            verdict_config,
            in_flight: Arc::new(Mutex::new(None)),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn get_snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn select_file(&self, document: Document) -> Result<SessionSnapshot, SessionError> {
        let name = document.name().to_string();
        let snapshot = {
            let mut state = self.state.lock().await;
            state
                .select_document(document)
                .map_err(|err| self.surface(err))?;
            state.snapshot()
        };

        log_info!(
            "Selected {} for session {}",
            name,
            snapshot.session_id.as_deref().unwrap_or("-")
        );
        self.emit_phase_changed(&snapshot);
        Ok(snapshot)
    }

    pub async fn start_session(&self) -> Result<SessionSnapshot, SessionError> {
        let snapshot = {
            let mut state = self.state.lock().await;
            state.start(Utc::now()).map_err(|err| self.surface(err))?;
            state.snapshot()
        };

        self.emit_phase_changed(&snapshot);
        Ok(snapshot)
    }

    /// Appends the question right away and issues the request in the
    /// background. The answer (or error) is appended when it arrives.
    ///
    /// The round task is stored while the state lock is still held, so the
    /// slot always holds the newest round.
    pub async fn submit_question(&self, question: &str) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.state.lock().await;
        let round = state
            .begin_question(question)
            .map_err(|err| self.surface(err))?;
        let snapshot = state.snapshot();

        if let Some(exchange) = snapshot.transcript.last() {
            self.emit(SessionEvent::ExchangeAppended {
                session_id: round.session_id.clone(),
                exchange: exchange.clone(),
            });
        }

        let mut slot = self.in_flight.lock().await;
        self.spawn_round(&mut slot, round);
        drop(slot);
        drop(state);

        Ok(snapshot)
    }

    /// Waits for the in-flight question round-trip, if any, to be applied.
    pub async fn wait_for_answer(&self) {
        let handle = self.in_flight.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                log_error!("Question round-trip task failed to join: {}", err);
            }
        }
    }

    pub async fn end_session(&self) -> Result<SessionSnapshot, SessionError> {
        let (abandoned, snapshot) = {
            let mut state = self.state.lock().await;
            let abandoned = state.end(Utc::now()).map_err(|err| self.surface(err))?;
            (abandoned, state.snapshot())
        };

        if let Some(pending) = abandoned {
            log_info!(
                "Session ended with question '{}' still in flight; its answer will be dropped",
                pending.text
            );
        }

        self.emit_phase_changed(&snapshot);
        Ok(snapshot)
    }

    /// Sends feedback to the classifier and records the resulting verdict.
    /// Empty feedback is rejected without a remote call.
    pub async fn submit_feedback(&self, text: &str) -> Result<Verdict, SessionError> {
        let round = {
            let mut state = self.state.lock().await;
            state.begin_feedback(text).map_err(|err| self.surface(err))?
        };

        self.emit(SessionEvent::FeedbackPending {
            session_id: round.session_id.clone(),
        });

        let outcome = self
            .classifier
            .classify(round.text.as_str())
            .await
            .map_err(|err| err.feedback_message())
            .and_then(|result| self.verdict_for(&round.text, &result));

        let applied = {
            let mut state = self.state.lock().await;
            state.complete_feedback(&round.session_id, outcome.clone())
        };

        if !applied {
            log_warn!(
                "Discarding feedback result for replaced session {}",
                round.session_id
            );
            return Err(SessionError::Superseded);
        }

        match outcome {
            Ok(verdict) => {
                log_info!(
                    "Feedback verdict for session {}: {}",
                    round.session_id,
                    verdict.kind.as_str()
                );
                self.emit(SessionEvent::VerdictReady {
                    session_id: round.session_id,
                    verdict: verdict.clone(),
                });
                Ok(verdict)
            }
            Err(message) => {
                log_warn!("Feedback analysis failed: {}", message);
                self.emit(SessionEvent::FeedbackFailed {
                    session_id: round.session_id,
                    message: message.clone(),
                });
                Err(SessionError::Feedback(message))
            }
        }
    }

    fn verdict_for(
        &self,
        text: &FeedbackText,
        result: &ClassifierResult,
    ) -> Result<Verdict, String> {
        compute_verdict(text, result, &self.verdict_config).map_err(|err| err.to_string())
    }

    /// Lock order is state, then slot. The spawned task only takes the state
    /// lock, after the caller releases it.
    fn spawn_round(&self, slot: &mut Option<JoinHandle<()>>, round: QuestionRound) {
        if let Some(previous) = slot.take() {
            // Only a round abandoned by an ended or replaced session can still
            // be running here. Its outcome is discarded on arrival.
            if !previous.is_finished() {
                log_info!("Detaching question task from a previous session");
            }
        }

        let controller = self.clone();
        *slot = Some(tokio::spawn(async move {
            let outcome = controller.qa.ask(&round.document, &round.question).await;
            controller.finish_round(&round, outcome).await;
        }));
    }

    async fn finish_round(&self, round: &QuestionRound, outcome: Result<String, ServiceError>) {
        if let Err(err) = &outcome {
            log_warn!("Question round-trip failed: {}", err);
        }

        let applied = {
            let mut state = self.state.lock().await;
            state.complete_question(&round.session_id, round.round_id, outcome)
        };

        match applied {
            RoundOutcome::Appended(exchange) => self.emit(SessionEvent::ExchangeAppended {
                session_id: round.session_id.clone(),
                exchange,
            }),
            RoundOutcome::Discarded => {
                log_info!(
                    "Discarding late answer for session {}",
                    round.session_id
                );
                self.emit(SessionEvent::AnswerDiscarded {
                    session_id: round.session_id.clone(),
                });
            }
        }
    }

    fn surface(&self, err: SessionError) -> SessionError {
        if err.is_validation() {
            self.emit(SessionEvent::ValidationFailed {
                message: err.to_string(),
            });
        }
        err
    }

    fn emit_phase_changed(&self, snapshot: &SessionSnapshot) {
        self.emit(SessionEvent::PhaseChanged {
            snapshot: snapshot.clone(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}
