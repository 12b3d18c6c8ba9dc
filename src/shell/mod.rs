//! Line-oriented front end. It only parses input, calls the session commands
//! and prints what comes back; the controller owns every decision.

pub mod render;

use std::{io::Write, path::PathBuf, str::FromStr};

use anyhow::Result;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tokio_util::sync::CancellationToken;

use crate::{
    log_debug, log_error, log_warn,
    session::{commands, SessionEvent},
    AppState,
};

const ENABLE_LOGS: bool = true;

const HELP: &str = "\
Commands:
  open <path>        choose a PDF (starts a new session)
  start              start asking questions about the chosen PDF
  ask <question>     ask a question
  end                end the session and open feedback
  feedback <text>    rate the answers
  show               print the current session
  settings [reload]  show the settings file (reload re-reads it from disk)
  status             check that the analyzer service is reachable
  help               show this help
  quit               exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Open(PathBuf),
    Start,
    Ask(String),
    End,
    Feedback(String),
    Show,
    Status,
    Settings { reload: bool },
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "open" | "file" if rest.is_empty() => Err("Usage: open <path-to-pdf>".to_string()),
            "open" | "file" => Ok(ShellCommand::Open(PathBuf::from(rest))),
            "start" => Ok(ShellCommand::Start),
            // Blank text is passed through so the controller reports it.
            "ask" | "q" => Ok(ShellCommand::Ask(rest.to_string())),
            "end" => Ok(ShellCommand::End),
            "feedback" | "fb" => Ok(ShellCommand::Feedback(rest.to_string())),
            "show" => Ok(ShellCommand::Show),
            "status" => Ok(ShellCommand::Status),
            "settings" => match rest {
                "" => Ok(ShellCommand::Settings { reload: false }),
                "reload" => Ok(ShellCommand::Settings { reload: true }),
                _ => Err("Usage: settings [reload]".to_string()),
            },
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(format!("Unknown command '{other}'. Type `help` for a list.")),
        }
    }
}

pub async fn run(state: &AppState, initial_file: Option<PathBuf>) -> Result<()> {
    let cancel = CancellationToken::new();
    let renderer = tokio::spawn(render_events(state.controller.subscribe(), cancel.clone()));

    println!("Smart Document Analyzer (service at {})", state.client.base_url());
    println!("Type `help` for commands.");

    if let Some(path) = initial_file {
        if let Err(message) = commands::open_file(&state.controller, &path).await {
            println!("! {message}");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ShellCommand>() {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        if command == ShellCommand::Quit {
            break;
        }
        dispatch(state, command).await;
    }

    cancel.cancel();
    if let Err(err) = renderer.await {
        log_error!("Event renderer failed to join: {}", err);
    }
    Ok(())
}

async fn dispatch(state: &AppState, command: ShellCommand) {
    let controller = &state.controller;
    let result = match command {
        ShellCommand::Open(path) => commands::open_file(controller, &path).await.map(|_| ()),
        ShellCommand::Start => commands::start_session(controller).await.map(|_| ()),
        ShellCommand::Ask(question) => match commands::ask_question(controller, &question).await {
            Ok(_) => {
                println!("Thinking...");
                controller.wait_for_answer().await;
                // Let the renderer print the answer before the next prompt.
                tokio::task::yield_now().await;
                Ok(())
            }
            Err(message) => Err(message),
        },
        ShellCommand::End => commands::end_session(controller).await.map(|_| ()),
        ShellCommand::Feedback(text) => {
            println!("Analyzing feedback...");
            commands::submit_feedback(controller, &text)
                .await
                .map(|verdict| print!("{}", render::verdict_block(&verdict)))
        }
        ShellCommand::Show => {
            let snapshot = commands::get_session_state(controller).await;
            print!("{}", render::snapshot_block(&snapshot));
            Ok(())
        }
        ShellCommand::Status => match state.client.health().await {
            Ok(message) => {
                println!("Service OK: {message}");
                Ok(())
            }
            Err(err) => Err(format!("Service unreachable: {err}")),
        },
        ShellCommand::Settings { reload } => show_settings(state, reload),
        ShellCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        ShellCommand::Quit => Ok(()),
    };

    if let Err(message) = result {
        println!("! {message}");
    }
}

/// Prints transcript and phase changes as the controller reports them.
/// Validation and feedback outcomes are printed by `dispatch` instead.
async fn render_events(mut events: broadcast::Receiver<SessionEvent>, cancel: CancellationToken) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Ok(SessionEvent::PhaseChanged { snapshot }) => println!("{}", render::phase_line(&snapshot)),
            Ok(SessionEvent::ExchangeAppended { exchange, .. }) => {
                println!("{}", render::exchange_line(&exchange));
            }
            Ok(SessionEvent::AnswerDiscarded { .. }) => {
                println!("(an answer arrived after its session ended or was replaced and was dropped)");
            }
            Ok(other) => log_debug!("Event handled by dispatch: {:?}", other),
            Err(RecvError::Lagged(skipped)) => log_warn!("Renderer skipped {} events", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}

fn show_settings(state: &AppState, reload: bool) -> Result<(), String> {
    if reload {
        state.settings.reload().map_err(|e| format!("{e:#}"))?;
        println!("Reloaded. Service and threshold changes apply on the next start.");
    }
    let settings = state.settings.settings();
    println!("Settings file: {}", state.settings.path().display());
    println!("  api_base_url: {}", settings.api_base_url);
    println!("  request_timeout_secs: {}", settings.request_timeout_secs);
    println!(
        "  verdict: minPositiveSentiment={} minHelpfulness={}",
        settings.verdict.min_positive_sentiment, settings.verdict.min_helpfulness
    );
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
