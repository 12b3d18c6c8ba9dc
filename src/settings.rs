use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
    time::Duration,
};

use crate::feedback::VerdictConfig;

pub const API_URL_ENV: &str = "DOCANALYZER_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub verdict: VerdictConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".into(),
            request_timeout_secs: 60,
            verdict: VerdictConfig::default(),
        }
    }
}

impl AppSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Applies overrides on top of the stored settings: an explicit value
    /// wins over the environment, which wins over the file.
    pub fn with_overrides(
        mut self,
        env_api_url: Option<String>,
        api_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        if let Some(url) = api_url.or(env_api_url).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(timeout) = timeout_secs {
            self.request_timeout_secs = timeout;
        }
        self
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    /// Loads settings from `path`, writing defaults there when the file does
    /// not exist yet. A file that fails to parse falls back to defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring unreadable settings file {}: {}",
                    path.display(),
                    err
                );
                AppSettings::default()
            })
        } else {
            let defaults = AppSettings::default();
            persist_to(&path, &defaults)?;
            defaults
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine the user config directory"))?;
        Ok(base.join("docanalyzer").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> AppSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: AppSettings = serde_json::from_str(&contents)?;
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *guard = data;
        Ok(())
    }
}

fn persist_to(path: &Path, data: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings directory {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(data)?;
    fs::write(path, serialized)
        .with_context(|| format!("Failed to write settings to {}", path.display()))
}
