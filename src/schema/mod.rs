//! Schema definitions and validation for SCIM resources.
//!
//! This module provides the SCIM schema model implementing RFC 7643, the
//! embedded core schemas, and whole-resource validation.
//!
//! # Key Types
//!
//! - [`Schema`] - SCIM schema definition with attributes and metadata
//! - [`SchemaSet`] - The schemas in force for one resource type, passed
//!   explicitly into every resolution and processing call
//! - [`AttributeDefinition`] - Individual attribute specifications and
//!   constraints, including the [`AttributeShape`] classification patch
//!   semantics dispatch on
//!
//! # Examples
//!
//! ```rust
//! use scim_patch::schema::SchemaSet;
//!
//! let schemas = SchemaSet::user();
//! let (container, attr) = schemas.find_attribute("employeeNumber").unwrap();
//! assert!(container.is_some()); // lives in the enterprise extension
//! assert_eq!(attr.name, "employeeNumber");
//! ```

pub mod embedded;
pub mod set;
pub mod types;
pub mod validation;

// Re-export the main types for convenience
pub use set::SchemaSet;
pub use types::{
    AttributeDefinition, AttributeShape, AttributeType, Mutability, Schema, Uniqueness,
};
