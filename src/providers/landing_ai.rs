use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::AUTHORIZATION,
    multipart::{Form, Part},
    StatusCode,
};
use serde_json::Value;

use crate::{
    core::errors::{AppError, AppResult},
    extraction::gateway::UploadedDocument,
    providers::DocumentExtractor,
};

pub const PDF_PART: &str = "pdf";
pub const SCHEMA_PART: &str = "fields_schema";

/// Client for the agentic document analysis endpoint.
#[derive(Debug, Clone)]
pub struct LandingAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl LandingAiClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    async fn build_form(&self, document: &UploadedDocument, fields_schema: &str) -> AppResult<Form> {
        let file = tokio::fs::File::open(document.path()).await?;
        let pdf = Part::stream_with_length(file, document.size())
            .file_name(document.original_name().to_string())
            .mime_str("application/pdf")?;
        Ok(Form::new()
            .part(PDF_PART, pdf)
            .text(SCHEMA_PART, fields_schema.to_string()))
    }
}

#[async_trait]
impl DocumentExtractor for LandingAiClient {
    async fn extract(&self, document: &UploadedDocument, fields_schema: &str) -> AppResult<Value> {
        let form = self.build_form(document, fields_schema).await?;

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Basic {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(AppError::from_transport)?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AppError::ProviderAuth),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::ProviderInvalidResponse(format!(
                    "status {status} body {body}"
                )));
            }
            _ => {}
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))
    }
}
