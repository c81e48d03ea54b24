pub mod firebase;
pub mod landing_ai;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    core::{errors::AppResult, types::UserRecord},
    extraction::gateway::UploadedDocument,
};

/// Turns a document plus a field schema into structured data.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Returns the full response body of the extraction service.
    async fn extract(&self, document: &UploadedDocument, fields_schema: &str) -> AppResult<Value>;
}

/// Account primitives of the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> AppResult<UserRecord>;

    async fn delete_user(&self, uid: &str) -> AppResult<()>;
}
