//! Plain-text rendering of session state for the terminal.

use std::fmt::Write;

use crate::feedback::{HelpfulnessBreakdown, SentimentBreakdown, Verdict};
use crate::models::{Exchange, ExchangeKind};
use crate::session::{PhaseKind, SessionSnapshot};

const UNKNOWN: &str = "—";

pub fn exchange_line(exchange: &Exchange) -> String {
    match exchange.kind {
        ExchangeKind::Question => format!("Q: {}", exchange.text),
        ExchangeKind::Answer => format!("A: {}", exchange.text),
        ExchangeKind::Error => format!("! {}", exchange.text),
    }
}

pub fn phase_line(snapshot: &SessionSnapshot) -> String {
    match snapshot.phase {
        PhaseKind::NoFile => "No file selected. Use `open <path>` to choose a PDF.".to_string(),
        PhaseKind::FileSelected => match &snapshot.document {
            Some(doc) => format!(
                "Selected {} ({}). Type `start` to begin.",
                doc.name,
                doc.size_label()
            ),
            None => "File selected. Type `start` to begin.".to_string(),
        },
        PhaseKind::Active => "Session started. Ask with `ask <question>`, finish with `end`.".to_string(),
        PhaseKind::Ended => format!(
            "Session ended after {} exchange(s). Rate the answers with `feedback <text>`.",
            snapshot.transcript.len()
        ),
    }
}

pub fn snapshot_block(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Phase: {}", snapshot.phase);
    if let Some(doc) = &snapshot.document {
        let _ = writeln!(out, "Document: {} ({})", doc.name, doc.size_label());
    }
    for exchange in &snapshot.transcript {
        let _ = writeln!(out, "  {}", exchange_line(exchange));
    }
    if let Some(question) = &snapshot.pending_question {
        let _ = writeln!(out, "Thinking about: {question}");
    }
    if let Some(feedback) = &snapshot.feedback {
        if feedback.pending {
            let _ = writeln!(out, "Analyzing feedback...");
        }
        if let Some(verdict) = &feedback.verdict {
            out.push_str(&verdict_block(verdict));
        }
        if let Some(error) = &feedback.error {
            let _ = writeln!(out, "! {error}");
        }
    }
    out
}

pub fn verdict_block(verdict: &Verdict) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", verdict.kind.as_str(), verdict.message);
    if let Some(sentiment) = &verdict.sentiment {
        out.push_str(&sentiment_block(sentiment));
    }
    if let Some(helpfulness) = &verdict.helpfulness {
        out.push_str(&helpfulness_block(helpfulness));
    }
    out
}

fn sentiment_block(sentiment: &SentimentBreakdown) -> String {
    format!(
        "Sentiment polarity: classified as {}\n  Positive: {}% | Negative: {}%\n",
        sentiment.label,
        sentiment.distribution.positive_pct,
        sentiment.distribution.negative_pct
    )
}

fn helpfulness_block(helpfulness: &HelpfulnessBreakdown) -> String {
    let rows: Vec<String> = helpfulness
        .rows()
        .iter()
        .map(|row| {
            let value = row
                .pct
                .map(|pct| format!("{pct}%"))
                .unwrap_or_else(|| UNKNOWN.to_string());
            format!("{}: {}", capitalize(row.category.as_str()), value)
        })
        .collect();

    format!(
        "Helpfulness: classified as {} with confidence {}%\n  {}\n",
        helpfulness.label,
        helpfulness.helpfulness_pct,
        rows.join("  ")
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
