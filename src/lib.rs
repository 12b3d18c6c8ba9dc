mod error;
mod feedback;
mod models;
mod services;
mod session;
mod settings;
mod shell;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use services::AnalyzerApiClient;
use session::SessionController;
use settings::{SettingsStore, API_URL_ENV};

pub(crate) struct AppState {
    pub(crate) controller: SessionController,
    pub(crate) client: Arc<AnalyzerApiClient>,
    pub(crate) settings: SettingsStore,
}

/// Ask questions about a PDF and rate the answers.
#[derive(Debug, Parser)]
#[command(name = "docanalyzer", version, about)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Base URL of the analyzer service
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// PDF to select on startup
    #[arg(long)]
    file: Option<PathBuf>,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    utils::logging::init();

    log::info!("Smart Document Analyzer starting up...");

    let settings_path = match cli.settings {
        Some(path) => path,
        None => SettingsStore::default_path()?,
    };
    let settings_store = SettingsStore::new(settings_path)?;
    let settings = settings_store.settings().with_overrides(
        std::env::var(API_URL_ENV).ok(),
        cli.api_url,
        cli.timeout,
    );
    log::info!(
        "Using analyzer service at {} (settings: {})",
        settings.api_base_url,
        settings_store.path().display()
    );

    let client = Arc::new(AnalyzerApiClient::new(
        settings.api_base_url.clone(),
        settings.request_timeout(),
    )?);
    let controller = SessionController::new(client.clone(), client.clone(), settings.verdict);

    let state = AppState {
        controller,
        client,
        settings: settings_store,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(shell::run(&state, cli.file))
}
