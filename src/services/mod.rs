//! Remote collaborators consumed by the session controller.
//!
//! The controller only sees these traits; `http` provides the implementation
//! that talks to the analyzer API.

pub mod http;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::models::{ClassifierResult, Document};

pub use http::AnalyzerApiClient;

/// Answers a question about a document.
#[async_trait]
pub trait QuestionAnswering: Send + Sync {
    async fn ask(&self, document: &Document, question: &str) -> Result<String, ServiceError>;
}

/// Scores feedback text for sentiment and helpfulness.
#[async_trait]
pub trait FeedbackClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierResult, ServiceError>;
}
