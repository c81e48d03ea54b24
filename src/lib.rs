pub mod accounts;
pub mod commands;
pub mod core;
pub mod extraction;
pub mod providers;
pub mod security;
pub mod server;

use std::{sync::Arc, time::Instant};

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::core::{config::Config, errors::AppResult};
use extraction::gateway::ExtractionGateway;
use providers::{
    firebase::FirebaseAuthClient, landing_ai::LandingAiClient, DocumentExtractor, IdentityProvider,
};
use security::credentials::load_service_account;

pub const SERVICE_NAME: &str = "nursery-registration-api";

fn log_level_from_env() -> &'static str {
    match std::env::var("RELAY_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}

fn http_debug_enabled() -> bool {
    matches!(
        std::env::var("RELAY_HTTP_DEBUG")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}

pub fn init_tracing() {
    let mut directives = log_level_from_env().to_string();
    if !http_debug_enabled() {
        directives.push_str(",hyper=warn,hyper_util=warn,reqwest=warn,h2=warn");
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .try_init();
}

#[derive(Clone)]
pub struct AppState {
    pub gateway: ExtractionGateway,
    pub identity: Arc<dyn IdentityProvider>,
    pub started_at: Instant,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        identity: Arc<dyn IdentityProvider>,
        config: &Config,
    ) -> Self {
        Self {
            gateway: ExtractionGateway::new(extractor, config.upload_dir.clone()),
            identity,
            started_at: Instant::now(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Initializes every external client once; any failure aborts startup.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let account = load_service_account(&config.credentials)?;
        let identity = match &config.auth_emulator_host {
            Some(host) => {
                info!(host = %host, project_id = %account.project_id, "using auth emulator");
                FirebaseAuthClient::emulator(host, &account.project_id, config.identity_timeout)?
            }
            None => FirebaseAuthClient::new(account, config.identity_timeout)?,
        };
        info!("identity provider initialized");

        let extractor = LandingAiClient::new(
            config.extraction_url.clone(),
            config.extraction_api_key.clone(),
            config.extraction_timeout,
        )?;

        Ok(Self::new(Arc::new(extractor), Arc::new(identity), config))
    }
}

pub async fn run() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config)?;
    server::serve(&config, state).await
}
