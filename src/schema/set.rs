//! Per-request schema collections.
//!
//! A [`SchemaSet`] bundles the core schema of a resource type with its
//! extension schemas. The engine takes the set as an explicit argument on
//! every resolution and processing call; there is no process-global
//! registry, so two requests can use different schema collections without
//! interfering.

use super::embedded;
use super::types::{AttributeDefinition, Schema};

/// The schemas in force for one resource type.
///
/// Holds exactly one core schema and any number of extension schemas.
/// Attribute and URN lookups are case-insensitive, as SCIM requires.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    core: Schema,
    extensions: Vec<Schema>,
}

impl SchemaSet {
    /// Create a set around a core schema with no extensions.
    pub fn new(core: Schema) -> Self {
        Self {
            core,
            extensions: Vec::new(),
        }
    }

    /// Append an extension schema.
    pub fn with_extension(mut self, schema: Schema) -> Self {
        self.extensions.push(schema);
        self
    }

    /// The built-in set for User resources: core User plus the enterprise
    /// User extension.
    pub fn user() -> Self {
        Self::new(parse_embedded(embedded::core_user_schema()))
            .with_extension(parse_embedded(embedded::enterprise_user_schema()))
    }

    /// The built-in set for Group resources.
    pub fn group() -> Self {
        Self::new(parse_embedded(embedded::core_group_schema()))
    }

    /// The core schema of this set.
    pub fn core(&self) -> &Schema {
        &self.core
    }

    /// URN of the core schema.
    pub fn core_urn(&self) -> &str {
        &self.core.id
    }

    /// The extension schemas of this set.
    pub fn extensions(&self) -> &[Schema] {
        &self.extensions
    }

    /// All schema URNs, core first.
    pub fn urns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.core.id.as_str()).chain(self.extensions.iter().map(|s| s.id.as_str()))
    }

    /// Look up a schema by URN (case-insensitive).
    pub fn schema_by_urn(&self, urn: &str) -> Option<&Schema> {
        if self.core.id.eq_ignore_ascii_case(urn) {
            return Some(&self.core);
        }
        self.extensions
            .iter()
            .find(|schema| schema.id.eq_ignore_ascii_case(urn))
    }

    /// Whether the URN names this set's core schema.
    pub fn is_core_urn(&self, urn: &str) -> bool {
        self.core.id.eq_ignore_ascii_case(urn)
    }

    /// Find an unprefixed attribute, searching the core schema first and
    /// then each extension in order.
    ///
    /// Returns the extension URN the attribute belongs to (`None` for core
    /// attributes, which live at the top level of the resource) together
    /// with its definition.
    pub fn find_attribute(&self, name: &str) -> Option<(Option<&str>, &AttributeDefinition)> {
        if let Some(attr) = self.core.find_attribute(name) {
            return Some((None, attr));
        }
        for schema in &self.extensions {
            if let Some(attr) = schema.find_attribute(name) {
                return Some((Some(schema.id.as_str()), attr));
            }
        }
        None
    }
}

/// Parse one of the schemas this crate embeds.
///
/// The embedded documents are compile-time constants covered by unit
/// tests, so a parse failure here is a build defect rather than a runtime
/// condition.
fn parse_embedded(json: &str) -> Schema {
    serde_json::from_str(json).expect("embedded schema is valid JSON")
}
