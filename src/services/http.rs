//! HTTP client for the analyzer API.
//!
//! Endpoints:
//! - `POST /qa/ask-pdf` multipart form with `file` and `question`
//! - `POST /sentiment/analyze` JSON `{"text": ...}`
//! - `GET /` health probe

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{multipart, Client, Response};
use serde::{Deserialize, Serialize};

use super::{FeedbackClassifier, QuestionAnswering};
use crate::error::ServiceError;
use crate::models::{document::PDF_MIME, ClassifierResult, Document};

const ASK_PATH: &str = "qa/ask-pdf";
const ANALYZE_PATH: &str = "sentiment/analyze";

#[derive(Clone)]
pub struct AnalyzerApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    message: Option<String>,
}

impl AnalyzerApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Probes the service root.
    pub async fn health(&self) -> Result<String, ServiceError> {
        let response = self.client.get(self.endpoint("")).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: HealthResponse = response.json().await?;
        Ok(body.message.unwrap_or_else(|| "ok".to_string()))
    }
}

#[async_trait]
impl QuestionAnswering for AnalyzerApiClient {
    async fn ask(&self, document: &Document, question: &str) -> Result<String, ServiceError> {
        let file_part = multipart::Part::bytes(document.bytes().to_vec())
            .file_name(document.name().to_string())
            .mime_str(PDF_MIME)?;
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("question", question.to_string());

        debug!(
            "Asking about {} ({} bytes)",
            document.name(),
            document.len()
        );

        let response = self
            .client
            .post(self.endpoint(ASK_PATH))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: AskResponse = response.json().await?;
        interpret_answer(body)
    }
}

#[async_trait]
impl FeedbackClassifier for AnalyzerApiClient {
    async fn classify(&self, text: &str) -> Result<ClassifierResult, ServiceError> {
        let response = self
            .client
            .post(self.endpoint(ANALYZE_PATH))
            .json(&AnalyzeRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json().await?)
    }
}

fn interpret_answer(body: AskResponse) -> Result<String, ServiceError> {
    match body {
        AskResponse {
            answer: Some(answer),
            ..
        } if !answer.is_empty() => Ok(answer),
        AskResponse {
            error: Some(error), ..
        } => Err(ServiceError::Reported(error)),
        _ => Err(ServiceError::Protocol),
    }
}

async fn status_error(response: Response) -> ServiceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    ServiceError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        detail: parse_detail(&body),
    }
}

/// Extracts the `detail` field of an error body. Non-string details (e.g. a
/// list of validation errors) are returned as compact JSON.
fn parse_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}
