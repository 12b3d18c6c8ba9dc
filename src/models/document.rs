//! Document handle models.
//!
//! A `Document` is the opaque handle the session holds once a file has been
//! chosen. Bytes are shared so a question round-trip can carry them without
//! copying the whole file.

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    mime: String,
    bytes: Arc<[u8]>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let mime = mime_guess::from_path(&name)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes: Vec<u8> = bytes.into();

        Self {
            name,
            mime,
            bytes: Arc::from(bytes),
        }
    }

    /// Reads a file from disk. The result is not validated; callers decide
    /// whether it is acceptable through [`Document::is_pdf`].
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// The MIME type is derived from the file name, the same signal a browser
    /// file picker reports.
    pub fn is_pdf(&self) -> bool {
        self.mime == PDF_MIME
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            name: self.name.clone(),
            mime: self.mime.clone(),
            size_bytes: self.bytes.len() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub name: String,
    pub mime: String,
    pub size_bytes: u64,
}

impl DocumentInfo {
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }
}
