//! SCIM 2.0 patch resolution and application.
//!
//! Implements RFC 7644 Section 3.5.2 end to end: parsing attribute paths,
//! resolving them against a schema set, coercing raw JSON values to their
//! declared types, enforcing mutability, and applying add, remove and
//! replace operations with all-or-nothing semantics per document.
//!
//! # Key Types
//!
//! * [`PatchRequest`] / [`PatchOperation`] - deserialized `PatchOp` message
//! * [`PatchPath`] - parsed attribute path with optional value filter
//! * [`ResolvedPath`] - path bound to schema attribute definitions
//! * [`AttributeAccessor`] - shape-aware read and mutation capabilities
//! * [`PatchProcessor`] - ordered, fail-fast document application
//!
//! # Example
//!
//! ```rust
//! use scim_patch::patch::{PatchOperation, PatchProcessor, PatchRequest};
//! use scim_patch::resource::Resource;
//! use scim_patch::schema::SchemaSet;
//! use serde_json::json;
//!
//! let schemas = SchemaSet::user();
//! let resource = Resource::from_json("User", json!({
//!     "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!     "userName": "bjensen"
//! }))?;
//!
//! let request = PatchRequest::new(vec![
//!     PatchOperation::add(Some("active"), json!(true)),
//!     PatchOperation::replace(Some("userName"), json!("barbara.jensen")),
//! ]);
//!
//! let patched = PatchProcessor::new(&schemas).apply(resource, &request)?;
//! assert_eq!(patched.get_attribute("active"), Some(&json!(true)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accessor;
pub mod operations;
pub mod path;
pub mod processor;
pub mod resolver;

mod coerce;
mod executor;

pub use accessor::AttributeAccessor;
pub use operations::{PATCH_OP_URN, PatchOpKind, PatchOperation, PatchRequest};
pub use path::{FilterOp, PatchPath, ValueFilter};
pub use processor::PatchProcessor;
pub use resolver::{ResolvedPath, resolve};
