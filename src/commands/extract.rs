use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::{ErrorResponse, ExtractResponse},
    },
    extraction::gateway::UploadedDocument,
    AppState,
};

pub const FILE_FIELD: &str = "file";
pub const NO_FILE_MESSAGE: &str = "No file uploaded.";
pub const FILE_TOO_LARGE_MESSAGE: &str = "File too large.";
pub const EXTRACTION_FAILED_MESSAGE: &str = "Extraction failed.";
const FALLBACK_FILE_NAME: &str = "upload.pdf";

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Body limit overflows surface as 413; anything else is a malformed request.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::UploadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(err.body_text())
    }
}

/// Streams the `file` part into the upload directory. Other parts are ignored.
async fn receive_upload(state: &AppState, multipart: &mut Multipart) -> AppResult<Option<UploadedDocument>> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_string();
        let mut writer = state.gateway.begin_upload(original_name).await?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(multipart_error)?
        {
            writer.write_chunk(&chunk).await?;
        }
        return writer.finish().await.map(Some);
    }
    Ok(None)
}

pub async fn extract(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let Ok(mut multipart) = multipart else {
        warn!("extract request is not a multipart body");
        return error_response(StatusCode::BAD_REQUEST, NO_FILE_MESSAGE);
    };

    let document = match receive_upload(&state, &mut multipart).await {
        Ok(Some(document)) => document,
        Ok(None) => {
            warn!("extract request carried no file part");
            return error_response(StatusCode::BAD_REQUEST, NO_FILE_MESSAGE);
        }
        Err(AppError::UploadTooLarge(detail)) => {
            warn!(detail = %detail, limit = state.max_upload_bytes, "upload rejected by size limit");
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, FILE_TOO_LARGE_MESSAGE);
        }
        Err(AppError::InvalidInput(detail)) => {
            warn!(detail = %detail, "malformed multipart upload");
            return error_response(StatusCode::BAD_REQUEST, NO_FILE_MESSAGE);
        }
        Err(err) => {
            error!(code = err.code(), error = %err, "failed to store upload");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, EXTRACTION_FAILED_MESSAGE);
        }
    };

    match state.gateway.extract(document).await {
        Ok(extracted_schema) => Json(ExtractResponse { extracted_schema }).into_response(),
        Err(err) => {
            error!(code = err.code(), error = %err, "extraction failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, EXTRACTION_FAILED_MESSAGE)
        }
    }
}
