use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde_json::Value;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    core::errors::{AppError, AppResult},
    extraction::{flatten::flatten, schema},
    providers::DocumentExtractor,
};

/// An uploaded form held in a temporary file for the lifetime of one request.
///
/// The backing file is removed when the value is dropped, whichever way the
/// request ends.
#[derive(Debug)]
pub struct UploadedDocument {
    job_id: String,
    file: NamedTempFile,
    original_name: String,
    size: u64,
    checksum: String,
}

impl UploadedDocument {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

/// Accumulates an upload in the upload directory as chunks arrive.
pub struct UploadWriter {
    job_id: String,
    file: NamedTempFile,
    writer: tokio::fs::File,
    original_name: String,
    hasher: Sha256,
    size: u64,
}

impl UploadWriter {
    pub async fn create(upload_dir: &Path, original_name: impl Into<String>) -> AppResult<Self> {
        tokio::fs::create_dir_all(upload_dir).await?;
        let job_id = Uuid::new_v4().to_string();
        let dir = upload_dir.to_path_buf();
        let (file, handle) = tokio::task::spawn_blocking(move || -> std::io::Result<_> {
            let file = tempfile::Builder::new()
                .prefix("upload-")
                .suffix(".pdf")
                .tempfile_in(dir)?;
            let handle = file.reopen()?;
            Ok((file, handle))
        })
        .await
        .map_err(|err| AppError::Internal(format!("upload setup task failed: {err}")))??;
        let writer = tokio::fs::File::from_std(handle);
        Ok(Self {
            job_id,
            file,
            writer,
            original_name: original_name.into(),
            hasher: Sha256::new(),
            size: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> AppResult<()> {
        self.writer.write_all(chunk).await?;
        self.hasher.update(chunk);
        self.size += chunk.len() as u64;
        Ok(())
    }

    pub async fn finish(mut self) -> AppResult<UploadedDocument> {
        self.writer.flush().await?;
        self.writer.sync_all().await?;
        Ok(UploadedDocument {
            job_id: self.job_id,
            file: self.file,
            original_name: self.original_name,
            size: self.size,
            checksum: format!("{:x}", self.hasher.finalize()),
        })
    }
}

/// Sends uploads with the field schema to the extraction service and flattens the reply.
#[derive(Clone)]
pub struct ExtractionGateway {
    extractor: Arc<dyn DocumentExtractor>,
    upload_dir: PathBuf,
    fields_schema: Arc<str>,
}

impl ExtractionGateway {
    pub fn new(extractor: Arc<dyn DocumentExtractor>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            extractor,
            upload_dir: upload_dir.into(),
            fields_schema: Arc::from(schema::json_schema_string()),
        }
    }

    pub async fn begin_upload(&self, original_name: impl Into<String>) -> AppResult<UploadWriter> {
        UploadWriter::create(&self.upload_dir, original_name).await
    }

    /// Consumes the upload; its temporary file is gone once this returns.
    pub async fn extract(&self, document: UploadedDocument) -> AppResult<Value> {
        info!(
            job_id = document.job_id(),
            file = document.original_name(),
            bytes = document.size(),
            checksum = document.checksum(),
            "forwarding document to extraction service"
        );

        let response = match self.extractor.extract(&document, &self.fields_schema).await {
            Ok(response) => response,
            Err(err) => {
                error!(job_id = document.job_id(), code = err.code(), error = %err, "extraction call failed");
                return Err(err);
            }
        };
        drop(document);

        let raw = extracted_schema(response)?;
        Ok(flatten(raw))
    }
}

/// Pulls `data.extracted_schema` out of the service response.
pub fn extracted_schema(mut response: Value) -> AppResult<Value> {
    response
        .get_mut("data")
        .and_then(|data| data.get_mut("extracted_schema"))
        .filter(|value| !value.is_null())
        .map(Value::take)
        .ok_or_else(|| {
            AppError::ProviderInvalidResponse("response lacks data.extracted_schema".to_string())
        })
}
