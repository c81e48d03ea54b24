use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::UserRecord,
    },
    providers::IdentityProvider,
    security::credentials::ServiceAccount,
};

pub const IDENTITY_TOOLKIT_HOST: &str = "https://identitytoolkit.googleapis.com";
const TOKEN_SCOPES: &str =
    "https://www.googleapis.com/auth/cloud-platform https://www.googleapis.com/auth/identitytoolkit";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
const EMULATOR_TOKEN: &str = "owner";
const MAX_UID_LEN: usize = 128;

pub const USER_NOT_FOUND: &str = "auth/user-not-found";
pub const INVALID_EMAIL: &str = "auth/invalid-email";
pub const INVALID_UID: &str = "auth/invalid-uid";
pub const INSUFFICIENT_PERMISSION: &str = "auth/insufficient-permission";
pub const INTERNAL_ERROR: &str = "auth/internal-error";

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Clone)]
enum Authorizer {
    Emulator,
    ServiceAccount {
        account: Arc<ServiceAccount>,
        key: EncodingKey,
        cache: Arc<Mutex<Option<CachedToken>>>,
    },
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserRecord>,
}

/// Account administration over the Identity Toolkit REST API.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    http: reqwest::Client,
    accounts_url: String,
    authorizer: Authorizer,
}

impl FirebaseAuthClient {
    /// Client authorized with a service account's signed JWT assertion.
    pub fn new(account: ServiceAccount, timeout: Duration) -> AppResult<Self> {
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|err| AppError::Credentials(format!("invalid private key: {err}")))?;
        let accounts_url = format!(
            "{IDENTITY_TOOLKIT_HOST}/v1/projects/{}",
            account.project_id
        );
        Ok(Self {
            http: build_http(timeout)?,
            accounts_url,
            authorizer: Authorizer::ServiceAccount {
                account: Arc::new(account),
                key,
                cache: Arc::new(Mutex::new(None)),
            },
        })
    }

    /// Client for the local auth emulator, which accepts a fixed bearer token.
    pub fn emulator(emulator_host: &str, project_id: &str, timeout: Duration) -> AppResult<Self> {
        let host = emulator_host.trim_end_matches('/');
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };
        Ok(Self {
            http: build_http(timeout)?,
            accounts_url: format!("{host}/identitytoolkit.googleapis.com/v1/projects/{project_id}"),
            authorizer: Authorizer::Emulator,
        })
    }

    pub fn accounts_url(&self) -> &str {
        &self.accounts_url
    }

    async fn access_token(&self) -> AppResult<String> {
        let (account, key, cache) = match &self.authorizer {
            Authorizer::Emulator => return Ok(EMULATOR_TOKEN.to_string()),
            Authorizer::ServiceAccount {
                account,
                key,
                cache,
            } => (account, key, cache),
        };

        let mut cached = cache.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(token.access_token.clone());
            }
        }

        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &account.client_email,
            scope: TOKEN_SCOPES,
            aud: &account.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = account.private_key_id.clone();
        let assertion = jsonwebtoken::encode(&header, &claims, key)
            .map_err(|err| AppError::Credentials(format!("cannot sign token assertion: {err}")))?;

        let response = self
            .http
            .post(&account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(AppError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Identity {
                code: INSUFFICIENT_PERMISSION.to_string(),
                message: format!("token exchange failed with status {status}: {body}"),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS as u64));
        debug!(client_email = %account.client_email, ?lifetime, "minted identity provider access token");

        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    async fn call(&self, method: &str, payload: &Value) -> AppResult<Value> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(format!("{}/accounts:{method}", self.accounts_url))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(AppError::from_transport)?;

        let status = response.status();
        let body: Value = match response.text().await {
            Ok(text) if !text.trim().is_empty() => {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            }
            Ok(_) => Value::Null,
            Err(err) => return Err(AppError::from_transport(err)),
        };

        if !status.is_success() {
            return Err(identity_error(status, &body));
        }
        Ok(body)
    }
}

fn build_http(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| AppError::Network(err.to_string()))
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn get_user_by_email(&self, email: &str) -> AppResult<UserRecord> {
        if !is_plausible_email(email) {
            return Err(AppError::Identity {
                code: INVALID_EMAIL.to_string(),
                message: "The email address is improperly formatted.".to_string(),
            });
        }

        let body = self
            .call("lookup", &serde_json::json!({ "email": [email] }))
            .await?;
        let lookup: LookupResponse = serde_json::from_value(body)
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        lookup.users.into_iter().next().ok_or_else(user_not_found)
    }

    async fn delete_user(&self, uid: &str) -> AppResult<()> {
        if uid.is_empty() || uid.chars().count() > MAX_UID_LEN {
            return Err(AppError::Identity {
                code: INVALID_UID.to_string(),
                message: "The uid must be a non-empty string with at most 128 characters."
                    .to_string(),
            });
        }

        self.call("delete", &serde_json::json!({ "localId": uid }))
            .await?;
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn user_not_found() -> AppError {
    AppError::Identity {
        code: USER_NOT_FOUND.to_string(),
        message: "There is no user record corresponding to the provided identifier.".to_string(),
    }
}

/// Translates an Identity Toolkit error body into the admin error taxonomy.
pub fn identity_error(status: StatusCode, body: &Value) -> AppError {
    let raw = body
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    // Messages look like "USER_NOT_FOUND" or "INVALID_ID_TOKEN : detail".
    let reason = raw.split(" : ").next().unwrap_or_default().trim();

    match reason {
        "USER_NOT_FOUND" => user_not_found(),
        "INVALID_EMAIL" => AppError::Identity {
            code: INVALID_EMAIL.to_string(),
            message: "The email address is improperly formatted.".to_string(),
        },
        "INVALID_LOCAL_ID" | "INVALID_UID" => AppError::Identity {
            code: INVALID_UID.to_string(),
            message: "The uid must be a non-empty string with at most 128 characters."
                .to_string(),
        },
        "PERMISSION_DENIED" | "INSUFFICIENT_PERMISSION" => AppError::Identity {
            code: INSUFFICIENT_PERMISSION.to_string(),
            message: format!("The credential used lacks permission: {raw}"),
        },
        _ if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
            AppError::Identity {
                code: INSUFFICIENT_PERMISSION.to_string(),
                message: format!("identity provider rejected the credential (status {status})"),
            }
        }
        _ => AppError::Identity {
            code: INTERNAL_ERROR.to_string(),
            message: if raw.is_empty() {
                format!("identity provider returned status {status}")
            } else {
                raw.to_string()
            },
        },
    }
}
