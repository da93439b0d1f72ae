//! Load-patch-persist flow over the in-memory repository.
//!
//! Exercises [`PatchService`] end to end: metadata stamping on the way to
//! storage, not-found handling, protocol error passthrough, and the
//! optimistic concurrency the weak version token gives callers.

use super::patch::{envelope, request};
use crate::common::builders::UserBuilder;
use scim_patch::repository::InMemoryRepositoryError;
use scim_patch::{
    InMemoryRepository, PatchService, PatchServiceError, RequestContext, ResourceRepository,
    SchemaSet, ScimErrorType,
};
use serde_json::json;

const USER_ID: &str = "2819c223-7f76-453a-919d-413861904646";

#[tokio::test]
async fn test_patch_round_trip_persists() {
    let repository = InMemoryRepository::new();
    let context = RequestContext::with_generated_id();
    let seeded = repository
        .seed(UserBuilder::new().build_resource())
        .await
        .unwrap();
    let seeded_version = seeded.meta_version().unwrap().to_string();

    let service = PatchService::new(repository.clone());
    let body = envelope(json!([
        {"op": "replace", "path": "userName", "value": "barbara.jensen"}
    ]));
    let patched = service
        .patch("User", USER_ID, &request(body), &SchemaSet::user(), &context)
        .await
        .unwrap();

    assert_eq!(
        patched.get_attribute("userName"),
        Some(&json!("barbara.jensen"))
    );
    let new_version = patched.meta_version().unwrap();
    assert!(new_version.starts_with("W/\""));
    assert_ne!(new_version, seeded_version);

    // The store must agree with what the service handed back.
    let stored = repository
        .load("User", USER_ID, &context)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.get_attribute("userName"),
        Some(&json!("barbara.jensen"))
    );
    let meta = stored.get_attribute("meta").unwrap();
    assert!(meta.get("lastModified").is_some());
    assert_eq!(meta["resourceType"], json!("User"));
    assert_eq!(repository.count().await, 1);
}

#[tokio::test]
async fn test_missing_resource_reports_not_found() {
    let service = PatchService::new(InMemoryRepository::new());
    let context = RequestContext::with_generated_id();
    let body = envelope(json!([
        {"op": "replace", "path": "userName", "value": "nobody"}
    ]));

    let err = service
        .patch("User", "does-not-exist", &request(body), &SchemaSet::user(), &context)
        .await
        .unwrap_err();

    assert!(matches!(err, PatchServiceError::NotFound { .. }));
    assert_eq!(err.to_string(), "User 'does-not-exist' not found");
}

#[tokio::test]
async fn test_rejected_document_leaves_store_untouched() {
    let repository = InMemoryRepository::new();
    let context = RequestContext::with_generated_id();
    let seeded = repository
        .seed(UserBuilder::new().build_resource())
        .await
        .unwrap();
    let seeded_version = seeded.meta_version().unwrap().to_string();

    let service = PatchService::new(repository.clone());
    let body = envelope(json!([
        {"op": "replace", "path": "userName", "value": "never-stored"},
        {"op": "add", "path": "bogusAttr", "value": "x"}
    ]));
    let err = service
        .patch("User", USER_ID, &request(body), &SchemaSet::user(), &context)
        .await
        .unwrap_err();

    let scim = match err {
        PatchServiceError::Scim(scim) => scim,
        other => panic!("expected a protocol error, got {other}"),
    };
    assert_eq!(scim.status, 400);
    assert_eq!(scim.scim_type, Some(ScimErrorType::InvalidPath));

    let stored = repository
        .load("User", USER_ID, &context)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.get_attribute("userName"),
        Some(&json!("bjensen@example.com"))
    );
    assert_eq!(stored.meta_version().unwrap(), seeded_version);
}

#[tokio::test]
async fn test_stale_writer_is_refused_after_patch() {
    let repository = InMemoryRepository::new();
    let context = RequestContext::with_generated_id();
    repository
        .seed(UserBuilder::new().build_resource())
        .await
        .unwrap();

    // A second client loads the resource before the patch lands.
    let mut stale = repository
        .load("User", USER_ID, &context)
        .await
        .unwrap()
        .unwrap();

    let service = PatchService::new(repository.clone());
    let body = envelope(json!([
        {"op": "add", "path": "title", "value": "Tour Guide"}
    ]));
    service
        .patch("User", USER_ID, &request(body), &SchemaSet::user(), &context)
        .await
        .unwrap();

    stale.set_attribute("userName", json!("late-writer"));
    let err = repository.persist(stale, &context).await.unwrap_err();
    assert!(matches!(
        err,
        InMemoryRepositoryError::VersionConflict { .. }
    ));

    let current = repository
        .load("User", USER_ID, &context)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        current.get_attribute("title"),
        Some(&json!("Tour Guide"))
    );
    assert_eq!(
        current.get_attribute("userName"),
        Some(&json!("bjensen@example.com"))
    );
}

#[tokio::test]
async fn test_concurrent_patches_to_distinct_users() {
    let repository = InMemoryRepository::new();
    let context = RequestContext::with_generated_id();
    for i in 0..4 {
        repository
            .seed(
                UserBuilder::new()
                    .with_attribute("id", json!(format!("user-{i}")))
                    .with_attribute("userName", json!(format!("user{i}@example.com")))
                    .build_resource(),
            )
            .await
            .unwrap();
    }

    let service = PatchService::new(repository.clone());
    let schemas = SchemaSet::user();
    let patches = (0..4).map(|i| {
        let service = &service;
        let schemas = &schemas;
        let context = &context;
        async move {
            let body = envelope(json!([
                {"op": "add", "path": "displayName", "value": format!("User {i}")}
            ]));
            let id = format!("user-{i}");
            service
                .patch("User", &id, &request(body), schemas, context)
                .await
        }
    });

    let results = futures::future::join_all(patches).await;
    assert_eq!(repository.count().await, 4);
    for (i, result) in results.into_iter().enumerate() {
        let stored = result.unwrap();
        assert_eq!(
            stored.get_attribute("displayName"),
            Some(&json!(format!("User {i}")))
        );
    }
}

#[tokio::test]
async fn test_strict_remove_is_a_service_toggle() {
    let repository = InMemoryRepository::new();
    let context = RequestContext::with_generated_id();
    repository
        .seed(UserBuilder::new().build_resource())
        .await
        .unwrap();
    let body = envelope(json!([{"op": "remove", "path": "nickName"}]));

    let strict = PatchService::new(repository.clone()).with_strict_remove(true);
    let err = strict
        .patch("User", USER_ID, &request(body.clone()), &SchemaSet::user(), &context)
        .await
        .unwrap_err();
    let scim = match err {
        PatchServiceError::Scim(scim) => scim,
        other => panic!("expected a protocol error, got {other}"),
    };
    assert_eq!(scim.scim_type, Some(ScimErrorType::NoTarget));

    // The default service absorbs the same no-op remove.
    let lenient = PatchService::new(repository.clone());
    lenient
        .patch("User", USER_ID, &request(body), &SchemaSet::user(), &context)
        .await
        .unwrap();
}
