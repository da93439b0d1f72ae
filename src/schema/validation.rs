//! Whole-resource validation against a schema set.
//!
//! The patch processor runs this pass after the last operation of a
//! document has been applied: a patch that leaves the resource in a state
//! that no longer conforms to its schemas is rejected as a whole. The
//! checks cover the `schemas` attribute, extension containers, declared
//! attribute types and constraints, and unknown attributes.

use super::set::SchemaSet;
use super::types::{AttributeDefinition, AttributeType, Schema};
use crate::error::{ValidationError, ValidationResult};
use crate::resource::Resource;
use serde_json::{Map, Value};
use std::collections::HashSet;

impl SchemaSet {
    /// Validate a complete resource against this set.
    ///
    /// The resource must carry a well-formed `schemas` array that names the
    /// core schema and only URNs this set knows, every extension container
    /// must be a declared object, declared attributes must match their
    /// definitions, and no unknown top-level attributes may be present.
    pub fn validate_resource(&self, resource: &Resource) -> ValidationResult<()> {
        let obj = resource.data();

        self.validate_schemas_attribute(obj)?;
        self.validate_extension_containers(obj)?;
        validate_declared_attributes(self.core(), obj)?;
        for extension in self.extensions() {
            if let Some(container) = obj.get(&extension.id).and_then(Value::as_object) {
                validate_declared_attributes(extension, container)?;
            }
        }
        self.validate_no_unknown_attributes(obj)?;

        Ok(())
    }

    fn validate_schemas_attribute(&self, obj: &Map<String, Value>) -> ValidationResult<()> {
        let schemas_value = obj.get("schemas").ok_or(ValidationError::MissingSchemas)?;

        // A null here is the classic broken-client case and must fail
        // validation rather than pass as "absent".
        let schemas_array = schemas_value
            .as_array()
            .ok_or(ValidationError::InvalidSchemasType)?;

        if schemas_array.is_empty() {
            return Err(ValidationError::EmptySchemas);
        }

        let mut seen = HashSet::new();
        for entry in schemas_array {
            let uri = entry.as_str().ok_or(ValidationError::InvalidSchemaEntry)?;

            if !seen.insert(uri.to_ascii_lowercase()) {
                return Err(ValidationError::DuplicateSchemaUri {
                    uri: uri.to_string(),
                });
            }

            if self.schema_by_urn(uri).is_none() {
                return Err(ValidationError::UnknownSchemaUri {
                    uri: uri.to_string(),
                });
            }
        }

        if !seen.contains(&self.core_urn().to_ascii_lowercase()) {
            return Err(ValidationError::MissingBaseSchema {
                uri: self.core_urn().to_string(),
            });
        }

        Ok(())
    }

    fn validate_extension_containers(&self, obj: &Map<String, Value>) -> ValidationResult<()> {
        let declared: Vec<String> = obj
            .get("schemas")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_ascii_lowercase)
                    .collect()
            })
            .unwrap_or_default();

        for (key, value) in obj {
            if !key.to_ascii_lowercase().starts_with("urn:") {
                continue;
            }

            if self.schema_by_urn(key).is_none() || self.is_core_urn(key) {
                return Err(ValidationError::UnknownSchemaUri { uri: key.clone() });
            }
            if !value.is_object() {
                return Err(ValidationError::InvalidExtensionContainer { uri: key.clone() });
            }
            if !declared.contains(&key.to_ascii_lowercase()) {
                return Err(ValidationError::UndeclaredExtension { uri: key.clone() });
            }
        }

        Ok(())
    }

    fn validate_no_unknown_attributes(&self, obj: &Map<String, Value>) -> ValidationResult<()> {
        for key in obj.keys() {
            if key.to_ascii_lowercase().starts_with("urn:") {
                continue;
            }
            if self.core().find_attribute(key).is_none() {
                return Err(ValidationError::UnknownAttribute {
                    attribute: key.clone(),
                    schema_id: self.core_urn().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Validate every declared attribute of `schema` present in `obj`.
fn validate_declared_attributes(schema: &Schema, obj: &Map<String, Value>) -> ValidationResult<()> {
    for attr_def in &schema.attributes {
        validate_attribute(attr_def, obj)?;
    }
    Ok(())
}

fn validate_attribute(
    attr_def: &AttributeDefinition,
    obj: &Map<String, Value>,
) -> ValidationResult<()> {
    let value = obj.get(&attr_def.name);

    if attr_def.required && value.is_none() {
        return Err(ValidationError::missing_required(&attr_def.name));
    }

    let Some(value) = value else {
        return Ok(());
    };

    if value.is_null() {
        if attr_def.required {
            return Err(ValidationError::missing_required(&attr_def.name));
        }
        return Ok(());
    }

    if attr_def.multi_valued {
        let Some(array) = value.as_array() else {
            return Err(ValidationError::ExpectedMultiValue {
                attribute: attr_def.name.clone(),
            });
        };
        for item in array {
            validate_attribute_value(attr_def, item)?;
        }
    } else {
        if value.is_array() {
            return Err(ValidationError::ExpectedSingleValue {
                attribute: attr_def.name.clone(),
            });
        }
        validate_attribute_value(attr_def, value)?;
    }

    Ok(())
}

/// Validate one value (or one element of a multi-valued attribute) against
/// its definition's type and constraints.
fn validate_attribute_value(
    attr_def: &AttributeDefinition,
    value: &Value,
) -> ValidationResult<()> {
    match attr_def.data_type {
        AttributeType::String => {
            let Some(str_val) = value.as_str() else {
                return Err(ValidationError::invalid_type(
                    &attr_def.name,
                    "string",
                    json_type_name(value),
                ));
            };
            // Canonical comparison honors caseExact.
            let matches_canonical = |c: &String| {
                if attr_def.case_exact {
                    c == str_val
                } else {
                    c.eq_ignore_ascii_case(str_val)
                }
            };
            if !attr_def.canonical_values.is_empty()
                && !attr_def.canonical_values.iter().any(matches_canonical)
            {
                return Err(ValidationError::InvalidCanonicalValue {
                    attribute: attr_def.name.clone(),
                    value: str_val.to_string(),
                    allowed: attr_def.canonical_values.clone(),
                });
            }
        }
        AttributeType::Boolean => {
            if !value.is_boolean() {
                return Err(ValidationError::invalid_type(
                    &attr_def.name,
                    "boolean",
                    json_type_name(value),
                ));
            }
        }
        AttributeType::Integer => {
            if !value.is_i64() {
                return Err(ValidationError::invalid_type(
                    &attr_def.name,
                    "integer",
                    json_type_name(value),
                ));
            }
        }
        AttributeType::Decimal => {
            if !value.is_f64() && !value.is_i64() {
                return Err(ValidationError::invalid_type(
                    &attr_def.name,
                    "decimal",
                    json_type_name(value),
                ));
            }
        }
        AttributeType::DateTime => {
            let Some(str_val) = value.as_str() else {
                return Err(ValidationError::invalid_type(
                    &attr_def.name,
                    "dateTime",
                    json_type_name(value),
                ));
            };
            if !is_valid_datetime(str_val) {
                return Err(ValidationError::InvalidDateTimeFormat {
                    attribute: attr_def.name.clone(),
                    value: str_val.to_string(),
                });
            }
        }
        AttributeType::Binary => {
            let Some(str_val) = value.as_str() else {
                return Err(ValidationError::invalid_type(
                    &attr_def.name,
                    "binary",
                    json_type_name(value),
                ));
            };
            if !is_valid_base64(str_val) {
                return Err(ValidationError::InvalidBinaryData {
                    attribute: attr_def.name.clone(),
                    value: str_val.to_string(),
                });
            }
        }
        AttributeType::Reference => {
            let Some(str_val) = value.as_str() else {
                return Err(ValidationError::invalid_type(
                    &attr_def.name,
                    "reference",
                    json_type_name(value),
                ));
            };
            if !is_valid_uri(str_val) {
                return Err(ValidationError::InvalidReferenceUri {
                    attribute: attr_def.name.clone(),
                    uri: str_val.to_string(),
                });
            }
        }
        AttributeType::Complex => {
            let Some(sub_obj) = value.as_object() else {
                return Err(ValidationError::invalid_type(
                    &attr_def.name,
                    "complex",
                    json_type_name(value),
                ));
            };

            for sub_attr in &attr_def.sub_attributes {
                if sub_attr.required && !sub_obj.contains_key(&sub_attr.name) {
                    return Err(ValidationError::missing_required(format!(
                        "{}.{}",
                        attr_def.name, sub_attr.name
                    )));
                }
                if let Some(sub_value) = sub_obj.get(&sub_attr.name) {
                    if sub_value.is_null() {
                        continue;
                    }
                    validate_attribute_value(sub_attr, sub_value)?;
                }
            }

            for key in sub_obj.keys() {
                if attr_def.find_sub_attribute(key).is_none() {
                    return Err(ValidationError::UnknownAttribute {
                        attribute: format!("{}.{}", attr_def.name, key),
                        schema_id: attr_def.name.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

/// JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// RFC 3339 datetime check, as SCIM dateTime values require.
pub(crate) fn is_valid_datetime(value: &str) -> bool {
    chrono::DateTime::<chrono::FixedOffset>::parse_from_rfc3339(value).is_ok()
}

/// Base64 check for binary attribute values.
pub(crate) fn is_valid_base64(value: &str) -> bool {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(value).is_ok()
}

/// URI shape check for reference attribute values.
///
/// Accepts scheme-qualified URIs and URNs. Backslash-ridden strings like
/// `\badthing` fail, which is what clients sending broken `$ref` values
/// produce.
pub(crate) fn is_valid_uri(value: &str) -> bool {
    value.contains("://") || value.starts_with("urn:")
}
