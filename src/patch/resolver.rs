//! Binding parsed paths to schema attribute definitions.
//!
//! Resolution is where a syntactically valid path either acquires meaning
//! or is rejected: every name segment must exist in the schema set, a
//! value filter is only legal on a multi-valued complex attribute, and a
//! sub-attribute is only legal under a complex one. The resolved form
//! carries borrowed definitions so later stages never re-search the
//! schemas.

use crate::error::{PatchError, PatchResult};
use crate::patch::path::{PatchPath, ValueFilter};
use crate::schema::{AttributeDefinition, AttributeShape, SchemaSet};

/// A path bound to its attribute definitions.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPath<'a> {
    /// Extension schema URN the attribute lives under; `None` for the
    /// core schema
    pub schema_urn: Option<&'a str>,
    /// Definition of the targeted top-level attribute
    pub attribute: &'a AttributeDefinition,
    /// Definition of the targeted sub-attribute, when the path has one
    pub sub_attribute: Option<&'a AttributeDefinition>,
    /// Value filter from the path
    pub filter: Option<&'a ValueFilter>,
    filter_attribute: Option<&'a AttributeDefinition>,
}

impl<'a> ResolvedPath<'a> {
    /// Shape of the targeted top-level attribute.
    pub fn shape(&self) -> AttributeShape {
        self.attribute.shape()
    }

    /// Definition the operation ultimately writes: the sub-attribute when
    /// the path names one, otherwise the attribute itself.
    pub fn target_definition(&self) -> &'a AttributeDefinition {
        self.sub_attribute.unwrap_or(self.attribute)
    }

    /// `caseExact` characteristic of the sub-attribute the filter
    /// compares against.
    pub fn filter_case_exact(&self) -> bool {
        self.filter_attribute.is_some_and(|def| def.case_exact)
    }
}

/// Resolve a parsed path against a schema set.
pub fn resolve<'a>(path: &'a PatchPath, schemas: &'a SchemaSet) -> PatchResult<ResolvedPath<'a>> {
    let (schema_urn, attribute) = match &path.schema_urn {
        Some(urn) => {
            let schema = schemas
                .schema_by_urn(urn)
                .ok_or_else(|| PatchError::UnknownSchemaUrn { urn: urn.clone() })?;
            let definition = schema
                .find_attribute(&path.attribute)
                .ok_or_else(|| PatchError::unknown_attribute(&path.attribute))?;
            let container = if schemas.is_core_urn(urn) {
                None
            } else {
                Some(schema.id.as_str())
            };
            (container, definition)
        }
        None => schemas
            .find_attribute(&path.attribute)
            .ok_or_else(|| PatchError::unknown_attribute(&path.attribute))?,
    };

    let filter = path.filter.as_ref();
    let filter_attribute = match filter {
        Some(value_filter) => {
            if attribute.shape() != AttributeShape::MultiValuedComplex {
                return Err(PatchError::FilterNotApplicable {
                    attribute: attribute.name.clone(),
                });
            }
            let definition = attribute
                .find_sub_attribute(&value_filter.attribute)
                .ok_or_else(|| PatchError::FilterAttributeUnknown {
                    attribute: attribute.name.clone(),
                    sub_attribute: value_filter.attribute.clone(),
                })?;
            Some(definition)
        }
        None => None,
    };

    let sub_attribute = match &path.sub_attribute {
        Some(name) => {
            let is_complex = matches!(
                attribute.shape(),
                AttributeShape::SingleValuedComplex | AttributeShape::MultiValuedComplex
            );
            if !is_complex {
                return Err(PatchError::NotComplex {
                    attribute: attribute.name.clone(),
                });
            }
            let definition = attribute.find_sub_attribute(name).ok_or_else(|| {
                PatchError::UnknownSubAttribute {
                    attribute: attribute.name.clone(),
                    sub_attribute: name.clone(),
                }
            })?;
            Some(definition)
        }
        None => None,
    };

    Ok(ResolvedPath {
        schema_urn,
        attribute,
        sub_attribute,
        filter,
        filter_attribute,
    })
}
