//! SCIM 2.0 patch resolution and application engine.
//!
//! Turns RFC 7644 `PatchOp` documents into schema-validated mutations of
//! JSON resources: attribute paths (with equality value filters) are
//! parsed and resolved against RFC 7643 schemas, values are coerced to
//! their declared types, mutability is enforced, and whole documents apply
//! atomically from the caller's point of view.
//!
//! # Core Components
//!
//! - [`PatchProcessor`] - ordered, fail-fast application of a patch document
//! - [`SchemaSet`] - core schema plus extensions for one resource type
//! - [`Resource`] - schema-validated JSON resource being patched
//! - [`PatchService`] - load-patch-persist flow over a [`ResourceRepository`]
//!
//! # Quick Start
//!
//! ```rust
//! use scim_patch::{PatchOperation, PatchProcessor, PatchRequest, Resource, SchemaSet};
//! use serde_json::json;
//!
//! let schemas = SchemaSet::user();
//! let resource = Resource::from_json("User", json!({
//!     "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!     "id": "2819c223",
//!     "userName": "bjensen"
//! }))?;
//!
//! let request = PatchRequest::new(vec![
//!     PatchOperation::replace(Some("userName"), json!("barbara.jensen")),
//!     PatchOperation::add(Some("emails"), json!([
//!         {"value": "babs@example.com", "type": "work"}
//!     ])),
//! ]);
//!
//! let patched = PatchProcessor::new(&schemas).apply(resource, &request)?;
//! assert_eq!(patched.get_attribute("userName"), Some(&json!("barbara.jensen")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Failures surface as [`ScimError`], the RFC 7644 error body with its
//! HTTP status and `scimType` discriminator already classified.

pub mod error;
pub mod patch;
pub mod repository;
pub mod resource;
pub mod schema;

// Re-export commonly used types for convenience
pub use error::{
    ERROR_MESSAGE_URN, PatchError, PatchResult, ScimError, ScimErrorType, ValidationError,
    ValidationResult,
};
pub use patch::{
    PATCH_OP_URN, PatchOpKind, PatchOperation, PatchPath, PatchProcessor, PatchRequest,
};
pub use repository::{InMemoryRepository, PatchService, PatchServiceError, ResourceRepository};
pub use resource::{RequestContext, Resource, ResourceVersion};
pub use schema::{AttributeDefinition, AttributeShape, Schema, SchemaSet};
