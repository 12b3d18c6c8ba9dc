//! Entry points used by the shell. Errors are flattened to their user-facing
//! message.

use std::path::Path;

use crate::{
    feedback::Verdict,
    models::Document,
    session::{SessionController, SessionSnapshot},
};

pub async fn get_session_state(controller: &SessionController) -> SessionSnapshot {
    controller.get_snapshot().await
}

pub async fn open_file(
    controller: &SessionController,
    path: &Path,
) -> Result<SessionSnapshot, String> {
    let document = Document::load(path).await.map_err(|e| format!("{e:#}"))?;
    controller
        .select_file(document)
        .await
        .map_err(|e| e.to_string())
}

pub async fn start_session(controller: &SessionController) -> Result<SessionSnapshot, String> {
    controller.start_session().await.map_err(|e| e.to_string())
}

pub async fn ask_question(
    controller: &SessionController,
    question: &str,
) -> Result<SessionSnapshot, String> {
    controller
        .submit_question(question)
        .await
        .map_err(|e| e.to_string())
}

pub async fn end_session(controller: &SessionController) -> Result<SessionSnapshot, String> {
    controller.end_session().await.map_err(|e| e.to_string())
}

pub async fn submit_feedback(
    controller: &SessionController,
    text: &str,
) -> Result<Verdict, String> {
    controller
        .submit_feedback(text)
        .await
        .map_err(|e| e.to_string())
}
