//! SCIM resource model.
//!
//! This module provides the JSON-backed resource representation the patch
//! engine edits, request-scoped context for log correlation, and content
//! versioning for optimistic concurrency at the repository seam.
//!
//! # Key Components
//!
//! * [`Resource`] - Schema-typed attribute bag backed by JSON
//! * [`RequestContext`] - Request tracking for logging and auditing
//! * [`ResourceVersion`] - Content-derived version for conflict detection

pub mod context;
pub mod resource;
pub mod version;

pub use context::RequestContext;
pub use resource::Resource;
pub use version::{ResourceVersion, VersionParseError};
