use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::{
    accounts::deletion,
    core::{
        errors::AppError,
        types::{DeleteUserRequest, DeleteUserResponse},
    },
    AppState,
};

pub async fn delete_user_from_auth(
    State(state): State<AppState>,
    body: Result<Json<DeleteUserRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        // Bodies without a JSON content type carry no fields.
        Err(JsonRejection::MissingJsonContentType(_)) => DeleteUserRequest::default(),
        Err(rejection) => {
            return AppError::InvalidInput(rejection.body_text()).into_response();
        }
    };
    info!(
        has_uid = request.uid.is_some(),
        has_email = request.email.is_some(),
        "delete user request received"
    );

    match deletion::delete_account(state.identity.as_ref(), &request).await {
        Ok(_) => Json(DeleteUserResponse { success: true }).into_response(),
        Err(err) => {
            error!(code = err.code(), error = %err, "auth deletion failed");
            err.into_response()
        }
    }
}
