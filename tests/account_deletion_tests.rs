mod common;

use intake_relay_lib::{
    accounts::deletion::{delete_account, resolve_uid, MISSING_IDENTITY, UNRESOLVED_IDENTITY},
    core::{errors::AppError, types::DeleteUserRequest},
};

use common::FakeIdentity;

fn request(uid: Option<&str>, email: Option<&str>) -> DeleteUserRequest {
    DeleteUserRequest {
        uid: uid.map(ToString::to_string),
        email: email.map(ToString::to_string),
    }
}

#[tokio::test]
async fn rejects_request_without_uid_or_email() {
    let identity = FakeIdentity::default();

    let err = delete_account(&identity, &request(None, None))
        .await
        .expect_err("empty request should fail");

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(err.to_string(), MISSING_IDENTITY);
    assert!(identity.lookups().is_empty());
    assert!(identity.deletions().is_empty());
}

#[tokio::test]
async fn blank_values_count_as_missing() {
    let identity = FakeIdentity::default();

    let err = delete_account(&identity, &request(Some("  "), Some("")))
        .await
        .expect_err("blank request should fail");

    assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    assert!(identity.deletions().is_empty());
}

#[tokio::test]
async fn uid_is_deleted_without_lookup() {
    let identity = FakeIdentity::default();

    let uid = delete_account(&identity, &request(Some("abc123"), Some("x@example.com")))
        .await
        .expect("delete by uid");

    assert_eq!(uid, "abc123");
    assert!(identity.lookups().is_empty());
    assert_eq!(identity.deletions(), vec!["abc123".to_string()]);
}

#[tokio::test]
async fn email_is_resolved_before_delete() {
    let identity = FakeIdentity::default().with_user("x@example.com", "uid-42");

    delete_account(&identity, &request(Some(""), Some("x@example.com")))
        .await
        .expect("delete by email");

    assert_eq!(identity.lookups(), vec!["x@example.com".to_string()]);
    assert_eq!(identity.deletions(), vec!["uid-42".to_string()]);
}

#[tokio::test]
async fn failed_lookup_never_deletes() {
    let identity = FakeIdentity::default();

    let err = delete_account(&identity, &request(None, Some("x@example.com")))
        .await
        .expect_err("unknown email should fail");

    assert_eq!(err.code(), "auth/user-not-found");
    assert!(err.to_string().contains("no user record"));
    assert!(identity.deletions().is_empty());
}

#[tokio::test]
async fn empty_resolved_uid_is_an_internal_error() {
    let identity = FakeIdentity::default().with_user("ghost@example.com", "");

    let err = resolve_uid(&identity, &request(None, Some("ghost@example.com")))
        .await
        .expect_err("empty uid should not resolve");

    assert!(matches!(err, AppError::Internal(_)));
    assert_eq!(err.to_string(), UNRESOLVED_IDENTITY);
    assert_eq!(err.code(), "UNKNOWN_ERROR");
}
