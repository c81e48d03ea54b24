use std::fmt;

use serde::Deserialize;

use crate::core::{
    config::CredentialSource,
    errors::{AppError, AppResult},
};

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Google service-account key, as downloaded from the console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccount {
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let account: Self = serde_json::from_str(raw)
            .map_err(|err| AppError::Credentials(format!("service account is not valid JSON: {err}")))?;
        account.validate()?;
        Ok(account)
    }

    fn validate(&self) -> AppResult<()> {
        if let Some(kind) = &self.account_type {
            if kind != "service_account" {
                return Err(AppError::Credentials(format!(
                    "expected a service_account credential, found '{kind}'"
                )));
            }
        }
        if self.project_id.trim().is_empty() {
            return Err(AppError::Credentials("project_id is empty".to_string()));
        }
        if self.client_email.trim().is_empty() {
            return Err(AppError::Credentials("client_email is empty".to_string()));
        }
        if !self.private_key.contains("PRIVATE KEY") {
            return Err(AppError::Credentials(
                "private_key is not a PEM encoded key".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_service_account(source: &CredentialSource) -> AppResult<ServiceAccount> {
    match source {
        CredentialSource::Inline(raw) => ServiceAccount::from_json(raw),
        CredentialSource::File(path) => {
            let raw = std::fs::read_to_string(path).map_err(|err| {
                AppError::Credentials(format!("cannot read {}: {err}", path.display()))
            })?;
            ServiceAccount::from_json(&raw)
        }
    }
}
