//! Schema-directed coercion of raw operation values.
//!
//! Patch values arrive as arbitrary JSON. Before mutation they are coerced
//! to the declared attribute type. Several tolerances match observed
//! identity-provider behavior rather than the strict grammar: Okta sends
//! bare scalars where the target is multi-valued, and Azure AD sends
//! string-typed booleans and integers and pads complex values with null
//! sub-attributes. Everything that cannot be folded into the declared type
//! is rejected.
//!
//! Coerced output always uses the schema's canonical sub-attribute
//! spelling, regardless of how the client cased the keys.

use crate::error::{PatchError, PatchResult};
use crate::schema::validation::{is_valid_base64, is_valid_datetime, is_valid_uri, json_type_name};
use crate::schema::{AttributeDefinition, AttributeShape, AttributeType};
use serde_json::{Map, Number, Value};

/// Coerce a value targeting a whole attribute.
///
/// Multi-valued attributes accept either an array or a single element,
/// which is wrapped.
pub(crate) fn coerce_attribute_value(
    definition: &AttributeDefinition,
    value: &Value,
) -> PatchResult<Value> {
    match definition.shape() {
        AttributeShape::SingleValuedScalar => coerce_single(definition, value, &definition.name),
        AttributeShape::SingleValuedComplex => coerce_complex(definition, value, &definition.name),
        AttributeShape::MultiValuedSimple => {
            let mut out = Vec::new();
            for element in fold_to_elements(value) {
                out.push(coerce_single(definition, element, &definition.name)?);
            }
            Ok(Value::Array(out))
        }
        AttributeShape::MultiValuedComplex => {
            let mut out = Vec::new();
            for element in fold_to_elements(value) {
                out.push(coerce_element_value(definition, element)?);
            }
            Ok(Value::Array(out))
        }
    }
}

/// Coerce one element of a multi-valued complex attribute.
///
/// Error paths use the singular element label, so a bad `$ref` inside
/// `members` reports against `member.$ref`.
pub(crate) fn coerce_element_value(
    definition: &AttributeDefinition,
    value: &Value,
) -> PatchResult<Value> {
    coerce_complex(definition, value, definition.element_label())
}

/// Coerce a value targeting one sub-attribute of a complex attribute.
pub(crate) fn coerce_sub_attribute_value(
    parent: &AttributeDefinition,
    sub: &AttributeDefinition,
    value: &Value,
) -> PatchResult<Value> {
    let label = if parent.shape() == AttributeShape::MultiValuedComplex {
        parent.element_label()
    } else {
        parent.name.as_str()
    };
    let path = format!("{label}.{}", sub.name);
    if sub.multi_valued {
        let mut out = Vec::new();
        for element in fold_to_elements(value) {
            out.push(coerce_single(sub, element, &path)?);
        }
        return Ok(Value::Array(out));
    }
    coerce_single(sub, value, &path)
}

/// View a value as multi-valued elements, wrapping bare scalars.
fn fold_to_elements(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn coerce_single(
    definition: &AttributeDefinition,
    value: &Value,
    path: &str,
) -> PatchResult<Value> {
    match definition.data_type {
        AttributeType::String => match value {
            Value::String(s) => {
                if definition.canonical_values.is_empty() {
                    return Ok(value.clone());
                }
                // Case variants of a canonical value fold to the declared
                // spelling unless the attribute is caseExact.
                let canonical = definition.canonical_values.iter().find(|c| {
                    if definition.case_exact {
                        *c == s
                    } else {
                        c.eq_ignore_ascii_case(s)
                    }
                });
                match canonical {
                    Some(c) => Ok(Value::String(c.clone())),
                    None => Err(PatchError::invalid_value(
                        path,
                        format!(
                            "'{s}' is not a canonical value (allowed: {})",
                            definition.canonical_values.join(", ")
                        ),
                    )),
                }
            }
            other => Err(type_mismatch(path, "a string", other)),
        },
        AttributeType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            other => Err(type_mismatch(path, "a boolean", other)),
        },
        AttributeType::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            Value::Number(_) => Err(PatchError::invalid_value(
                path,
                "expected an integer, found a decimal",
            )),
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(n) => Ok(Value::Number(Number::from(n))),
                Err(_) => Err(PatchError::invalid_value(
                    path,
                    format!("'{s}' is not an integer"),
                )),
            },
            other => Err(type_mismatch(path, "an integer", other)),
        },
        AttributeType::Decimal => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| {
                    PatchError::invalid_value(path, format!("'{s}' is not a decimal number"))
                }),
            other => Err(type_mismatch(path, "a decimal number", other)),
        },
        AttributeType::DateTime => match value {
            Value::String(s) if is_valid_datetime(s) => Ok(value.clone()),
            Value::String(s) => Err(PatchError::invalid_value(
                path,
                format!("'{s}' is not an RFC 3339 dateTime"),
            )),
            other => Err(type_mismatch(path, "an RFC 3339 dateTime string", other)),
        },
        AttributeType::Binary => match value {
            Value::String(s) if is_valid_base64(s) => Ok(value.clone()),
            Value::String(_) => Err(PatchError::invalid_value(path, "value is not valid base64")),
            other => Err(type_mismatch(path, "a base64 string", other)),
        },
        AttributeType::Reference => match value {
            Value::String(s) if is_valid_uri(s) => Ok(value.clone()),
            Value::String(s) => Err(PatchError::ReferenceSyntax {
                path: path.to_string(),
                value: s.clone(),
            }),
            other => Err(type_mismatch(path, "a URI string", other)),
        },
        AttributeType::Complex => coerce_complex(definition, value, path),
    }
}

fn coerce_complex(
    definition: &AttributeDefinition,
    value: &Value,
    path: &str,
) -> PatchResult<Value> {
    let Some(object) = value.as_object() else {
        return Err(type_mismatch(path, "a complex object", value));
    };

    let mut out = Map::new();
    for (key, raw) in object {
        let Some(sub) = definition.find_sub_attribute(key) else {
            return Err(PatchError::invalid_value(
                path,
                format!("unknown sub-attribute '{key}'"),
            ));
        };
        // Azure AD pads complex values with explicit nulls; treat them
        // as absent.
        if raw.is_null() {
            continue;
        }
        let sub_path = format!("{path}.{}", sub.name);
        let coerced = if sub.multi_valued {
            let mut elements = Vec::new();
            for element in fold_to_elements(raw) {
                elements.push(coerce_single(sub, element, &sub_path)?);
            }
            Value::Array(elements)
        } else {
            coerce_single(sub, raw, &sub_path)?
        };
        out.insert(sub.name.clone(), coerced);
    }
    Ok(Value::Object(out))
}

fn type_mismatch(path: &str, expected: &str, found: &Value) -> PatchError {
    PatchError::invalid_value(
        path,
        format!("expected {expected}, found {}", json_type_name(found)),
    )
}
