use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::core::errors::{AppError, AppResult};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_EXTRACTION_URL: &str =
    "https://api.va.landing.ai/v1/tools/agentic-document-analysis";
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "https://your-production-domain.com",
    "https://nursery-project-89d8b.web.app",
    "https://nursery-project-89d8b.firebaseapp.com",
];

/// Where the process is hosted. Selects upload storage and listener behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployTarget {
    /// Long-running process; falls back to the next port when the configured one is taken.
    Server,
    /// Function platform; writable storage is limited to `/tmp`, bind strictly.
    Serverless,
}

impl FromStr for DeployTarget {
    type Err = AppError;

    fn from_str(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "server" => Ok(Self::Server),
            "serverless" | "function" => Ok(Self::Serverless),
            other => Err(AppError::Config(format!(
                "unknown deploy target '{other}', expected 'server' or 'serverless'"
            ))),
        }
    }
}

impl DeployTarget {
    pub fn default_upload_dir(&self) -> PathBuf {
        match self {
            Self::Server => PathBuf::from("uploads"),
            Self::Serverless => std::env::temp_dir(),
        }
    }
}

/// Where the identity provider service account comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Serialized service-account JSON held in an environment variable.
    Inline(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub deploy_target: DeployTarget,
    pub upload_dir: PathBuf,
    pub extraction_url: String,
    pub extraction_api_key: String,
    pub credentials: CredentialSource,
    pub auth_emulator_host: Option<String>,
    pub cors_origins: Vec<String>,
    pub extraction_timeout: Duration,
    pub identity_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let deploy_target = match get("RELAY_DEPLOY_TARGET") {
            Some(raw) => raw.parse()?,
            None => DeployTarget::Server,
        };

        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;

        let upload_dir = get("RELAY_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| deploy_target.default_upload_dir());

        let extraction_url =
            get("VA_API_URL").unwrap_or_else(|| DEFAULT_EXTRACTION_URL.to_string());
        let extraction_api_key = get("VA_API_KEY")
            .ok_or_else(|| AppError::Config("VA_API_KEY must be set".to_string()))?;

        let credentials = match (
            get("FIREBASE_SERVICE_ACCOUNT"),
            get("FIREBASE_SERVICE_ACCOUNT_PATH"),
        ) {
            (Some(inline), _) => CredentialSource::Inline(inline),
            (None, Some(path)) => CredentialSource::File(PathBuf::from(path)),
            (None, None) => {
                return Err(AppError::Config(
                    "FIREBASE_SERVICE_ACCOUNT or FIREBASE_SERVICE_ACCOUNT_PATH must be set"
                        .to_string(),
                ))
            }
        };

        let cors_origins = match get("RELAY_CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(ToString::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS
                .iter()
                .map(ToString::to_string)
                .collect(),
        };

        let extraction_timeout = Duration::from_secs(parse_or(
            get("RELAY_EXTRACTION_TIMEOUT_SECS"),
            "RELAY_EXTRACTION_TIMEOUT_SECS",
            DEFAULT_EXTRACTION_TIMEOUT_SECS,
        )?);
        let identity_timeout = Duration::from_secs(parse_or(
            get("RELAY_IDENTITY_TIMEOUT_SECS"),
            "RELAY_IDENTITY_TIMEOUT_SECS",
            DEFAULT_IDENTITY_TIMEOUT_SECS,
        )?);
        let max_upload_bytes = parse_or(
            get("RELAY_MAX_UPLOAD_BYTES"),
            "RELAY_MAX_UPLOAD_BYTES",
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        Ok(Self {
            port,
            deploy_target,
            upload_dir,
            extraction_url,
            extraction_api_key,
            credentials,
            auth_emulator_host: get("FIREBASE_AUTH_EMULATOR_HOST"),
            cors_origins,
            extraction_timeout,
            identity_timeout,
            max_upload_bytes,
        })
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> AppResult<T> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value '{value}'"))),
        None => Ok(default),
    }
}
