mod common;

use std::sync::Arc;

use serde_json::json;

use intake_relay_lib::{
    core::errors::AppError,
    extraction::gateway::{extracted_schema, ExtractionGateway},
};

use common::{files_in, FakeExtractor};

#[test]
fn extracted_schema_reads_nested_data_path() {
    let raw = extracted_schema(json!({
        "data": {"extracted_schema": {"childName": "Ava"}},
        "errors": []
    }))
    .expect("path present");

    assert_eq!(raw, json!({"childName": "Ava"}));
}

#[test]
fn extracted_schema_rejects_missing_or_null_path() {
    for body in [json!({}), json!({"data": {}}), json!({"data": {"extracted_schema": null}})] {
        let err = extracted_schema(body).expect_err("path missing");
        assert!(matches!(err, AppError::ProviderInvalidResponse(_)));
    }
}

#[tokio::test]
async fn upload_records_size_and_checksum() {
    let dir = tempfile::tempdir().expect("tempdir");
    let extractor = Arc::new(FakeExtractor::failing());
    let gateway = ExtractionGateway::new(extractor, dir.path());

    let mut writer = gateway.begin_upload("form.pdf").await.expect("begin upload");
    writer.write_chunk(b"hello ").await.expect("chunk");
    writer.write_chunk(b"world").await.expect("chunk");
    let document = writer.finish().await.expect("finish upload");

    assert_eq!(document.size(), 11);
    assert_eq!(document.original_name(), "form.pdf");
    assert_eq!(
        document.checksum(),
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
    assert!(document.path().starts_with(dir.path()));
    assert_eq!(std::fs::read(document.path()).expect("read upload"), b"hello world");

    let path = document.path().to_path_buf();
    drop(document);
    assert!(!path.exists());
}

#[tokio::test]
async fn abandoned_upload_leaves_nothing_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gateway = ExtractionGateway::new(Arc::new(FakeExtractor::failing()), dir.path());

    let mut writer = gateway.begin_upload("form.pdf").await.expect("begin upload");
    writer.write_chunk(b"partial").await.expect("chunk");
    drop(writer);

    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn gateway_flattens_service_reply() {
    let dir = tempfile::tempdir().expect("tempdir");
    let extractor = Arc::new(FakeExtractor::replying(json!({
        "data": {"extracted_schema": {"childName": "Flat Ava"}}
    })));
    let gateway = ExtractionGateway::new(extractor.clone(), dir.path());

    let mut writer = gateway.begin_upload("form.pdf").await.expect("begin upload");
    writer.write_chunk(b"%PDF").await.expect("chunk");
    let document = writer.finish().await.expect("finish upload");

    let flat = gateway.extract(document).await.expect("extract");

    assert_eq!(flat, json!({"childName": "Flat Ava"}));
    assert_eq!(extractor.calls(), 1);
    assert_eq!(files_in(dir.path()), 0);
}

#[tokio::test]
async fn upload_directory_is_created_on_demand() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("uploads").join("incoming");
    let gateway = ExtractionGateway::new(Arc::new(FakeExtractor::failing()), &nested);

    let writer = gateway.begin_upload("form.pdf").await.expect("begin upload");

    assert!(nested.is_dir());
    drop(writer);
}
