use tracing::{info, warn};

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::DeleteUserRequest,
    },
    providers::IdentityProvider,
};

pub const MISSING_IDENTITY: &str = "Missing uid or email";
pub const UNRESOLVED_IDENTITY: &str = "Could not resolve user UID for deletion";

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

/// Resolves the account to delete: the uid when given, otherwise a lookup by email.
pub async fn resolve_uid(
    provider: &dyn IdentityProvider,
    request: &DeleteUserRequest,
) -> AppResult<String> {
    let uid = present(request.uid.as_deref());
    let email = present(request.email.as_deref());

    if uid.is_none() && email.is_none() {
        warn!("account deletion requested without uid or email");
        return Err(AppError::InvalidInput(MISSING_IDENTITY.to_string()));
    }

    let resolved = match (uid, email) {
        (Some(uid), _) => Some(uid.to_string()),
        (None, Some(email)) => {
            info!(email = %email, "looking up account by email");
            let record = provider.get_user_by_email(email).await?;
            info!(uid = %record.uid, "resolved account uid");
            Some(record.uid)
        }
        (None, None) => None,
    };

    resolved
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| AppError::Internal(UNRESOLVED_IDENTITY.to_string()))
}

/// Validate, resolve, delete. No retries.
pub async fn delete_account(
    provider: &dyn IdentityProvider,
    request: &DeleteUserRequest,
) -> AppResult<String> {
    let uid = resolve_uid(provider, request).await?;
    info!(uid = %uid, "deleting account");
    provider.delete_user(&uid).await?;
    info!(uid = %uid, "account deleted");
    Ok(uid)
}
