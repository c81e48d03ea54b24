#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::Value;

use intake_relay_lib::{
    core::{
        config::Config,
        errors::{AppError, AppResult},
        types::UserRecord,
    },
    extraction::gateway::UploadedDocument,
    providers::{DocumentExtractor, IdentityProvider},
    AppState,
};

/// Extraction service stand-in that records every document it sees.
#[derive(Default)]
pub struct FakeExtractor {
    reply: Option<Value>,
    pub seen: Mutex<Vec<SeenDocument>>,
}

#[derive(Debug, Clone)]
pub struct SeenDocument {
    pub path: PathBuf,
    pub original_name: String,
    pub bytes: Vec<u8>,
    pub fields_schema: String,
}

impl FakeExtractor {
    pub fn replying(reply: Value) -> Self {
        Self {
            reply: Some(reply),
            seen: Mutex::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().expect("seen lock").len()
    }

    pub fn last_seen(&self) -> Option<SeenDocument> {
        self.seen.lock().expect("seen lock").last().cloned()
    }
}

#[async_trait]
impl DocumentExtractor for FakeExtractor {
    async fn extract(&self, document: &UploadedDocument, fields_schema: &str) -> AppResult<Value> {
        let bytes = std::fs::read(document.path())?;
        self.seen.lock().expect("seen lock").push(SeenDocument {
            path: document.path().to_path_buf(),
            original_name: document.original_name().to_string(),
            bytes,
            fields_schema: fields_schema.to_string(),
        });
        self.reply
            .clone()
            .ok_or_else(|| AppError::Network("connection refused".to_string()))
    }
}

/// Identity provider stand-in keyed by email.
#[derive(Default)]
pub struct FakeIdentity {
    users: HashMap<String, String>,
    pub lookups: Mutex<Vec<String>>,
    pub deletions: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn with_user(mut self, email: &str, uid: &str) -> Self {
        self.users.insert(email.to_string(), uid.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("lookups lock").clone()
    }

    pub fn deletions(&self) -> Vec<String> {
        self.deletions.lock().expect("deletions lock").clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_user_by_email(&self, email: &str) -> AppResult<UserRecord> {
        self.lookups
            .lock()
            .expect("lookups lock")
            .push(email.to_string());
        match self.users.get(email) {
            Some(uid) => Ok(UserRecord {
                uid: uid.clone(),
                email: Some(email.to_string()),
                disabled: false,
            }),
            None => Err(AppError::Identity {
                code: "auth/user-not-found".to_string(),
                message: "There is no user record corresponding to the provided identifier."
                    .to_string(),
            }),
        }
    }

    async fn delete_user(&self, uid: &str) -> AppResult<()> {
        self.deletions
            .lock()
            .expect("deletions lock")
            .push(uid.to_string());
        Ok(())
    }
}

pub fn test_config(upload_dir: &Path) -> Config {
    let upload_dir = upload_dir.to_string_lossy().to_string();
    Config::from_lookup(|key| match key {
        "VA_API_KEY" => Some("test-key".to_string()),
        "FIREBASE_SERVICE_ACCOUNT" => Some("{}".to_string()),
        "RELAY_UPLOAD_DIR" => Some(upload_dir.clone()),
        _ => None,
    })
    .expect("test config")
}

pub fn test_state(
    upload_dir: &Path,
    extractor: Arc<FakeExtractor>,
    identity: Arc<FakeIdentity>,
) -> AppState {
    AppState::new(extractor, identity, &test_config(upload_dir))
}

pub fn multipart_body(boundary: &str, field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

pub fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}
