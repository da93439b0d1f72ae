//! SCIM PATCH Walkthrough
//!
//! Demonstrates the engine end to end: applying a PatchOp document to a
//! User resource, the classified error body a rejected document produces,
//! and the load-patch-persist flow with optimistic concurrency over the
//! in-memory repository.
//!
//! Run with: cargo run --example patch_demo

use scim_patch::{
    InMemoryRepository, PatchProcessor, PatchRequest, PatchService, RequestContext, Resource,
    ResourceRepository, SchemaSet,
};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🚀 SCIM PATCH engine walkthrough");

    // Apply a document straight through the processor.
    let schemas = SchemaSet::user();
    let user = Resource::from_json(
        "User",
        json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "2819c223-7f76-453a-919d-413861904646",
            "userName": "bjensen@example.com",
            "name": {"givenName": "Barbara", "familyName": "Jensen"},
            "emails": [
                {"value": "bjensen@example.com", "type": "work", "primary": true}
            ]
        }),
    )?;

    let request: PatchRequest = serde_json::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [
            {"op": "replace", "path": "name.givenName", "value": "Babs"},
            {"op": "add", "path": "emails", "value": [
                {"value": "babs@jensen.org", "type": "home"}
            ]},
            {"op": "add", "path": "emails[type eq \"work\"].display", "value": "Work mail"}
        ]
    }))?;

    let processor = PatchProcessor::new(&schemas);
    let patched = processor.apply(user.clone(), &request)?;
    println!(
        "✅ givenName is now {}",
        patched.to_json()["name"]["givenName"]
    );
    println!(
        "✅ {} email(s) on file",
        patched
            .get_attribute("emails")
            .and_then(|emails| emails.as_array())
            .map_or(0, Vec::len)
    );

    // A rejected document comes back as the RFC 7644 error body.
    let rejected: PatchRequest = serde_json::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [
            {"op": "replace", "path": "id", "value": "new-id"}
        ]
    }))?;
    let err = processor
        .apply(user, &rejected)
        .expect_err("replacing a read-only attribute must fail");
    println!(
        "❌ replacing 'id' is refused:\n{}",
        serde_json::to_string_pretty(&err)?
    );

    // Load-patch-persist: the repository stamps metadata and versions.
    println!("\n📦 load-patch-persist over the in-memory repository");
    let repository = InMemoryRepository::new();
    let context = RequestContext::with_generated_id();
    let seeded = repository
        .seed(Resource::from_json(
            "User",
            json!({
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "id": "e9e30dba-f08f-4109-8486-d5c6a331660a",
                "userName": "mandy@example.com"
            }),
        )?)
        .await?;
    println!("   seeded with version {}", seeded.meta_version().unwrap_or("-"));

    let service = PatchService::new(repository.clone());
    let promote: PatchRequest = serde_json::from_value(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [
            {"op": "add", "path": "title", "value": "Tour Guide"}
        ]
    }))?;
    let stored = service
        .patch(
            "User",
            "e9e30dba-f08f-4109-8486-d5c6a331660a",
            &promote,
            &schemas,
            &context,
        )
        .await?;
    println!("   patched to version {}", stored.meta_version().unwrap_or("-"));

    // A writer still holding the seeded version is refused.
    let mut stale = seeded;
    stale.set_attribute("title", json!("Late Writer"));
    let conflict = repository
        .persist(stale, &context)
        .await
        .expect_err("stale version must be refused");
    println!("🔒 {conflict}");

    Ok(())
}
