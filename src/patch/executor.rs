//! Single-operation execution pipeline.
//!
//! Each operation runs through `parse -> resolve -> coerce -> authorize ->
//! mutate`. Any stage failing stops the operation with a classified error
//! and the resource unchanged; the accessor's out-of-place mutation makes
//! the last stage atomic per operation.
//!
//! Operations without a path (legal for add and replace) treat the value
//! as an object of attribute names or extension URNs and run each key
//! through the same pipeline. Azure AD's dotted keys inside no-path
//! values, like `"name.givenName"`, fall out of this for free since each
//! key is parsed as a path.

use crate::error::{PatchError, PatchResult};
use crate::patch::accessor::AttributeAccessor;
use crate::patch::coerce::{
    coerce_attribute_value, coerce_element_value, coerce_sub_attribute_value,
};
use crate::patch::operations::{PatchOpKind, PatchOperation};
use crate::patch::path::PatchPath;
use crate::patch::resolver::{ResolvedPath, resolve};
use crate::resource::Resource;
use crate::schema::{AttributeShape, Mutability, SchemaSet};
use serde_json::Value;

/// Apply one operation to the resource in place.
pub(crate) fn apply_operation(
    resource: &mut Resource,
    operation: &PatchOperation,
    schemas: &SchemaSet,
    strict_remove: bool,
) -> PatchResult<()> {
    match operation.op {
        PatchOpKind::Add | PatchOpKind::Replace => {
            let Some(value) = &operation.value else {
                return Err(PatchError::invalid_operation(format!(
                    "{} operations require a value",
                    operation.op
                )));
            };
            match normalized_path(operation) {
                None => apply_root(resource, operation.op, value, schemas),
                Some(raw_path) => {
                    apply_at_path(resource, operation.op, raw_path, value, schemas)
                }
            }
        }
        PatchOpKind::Remove => {
            if operation.value.is_some() {
                return Err(PatchError::invalid_operation(
                    "remove operations must not carry a value",
                ));
            }
            let Some(raw_path) = normalized_path(operation) else {
                return Err(PatchError::RemoveWithoutPath);
            };
            let path = PatchPath::parse(raw_path)?;
            let resolved = resolve(&path, schemas)?;
            authorize(&resolved, resource, raw_path)?;
            AttributeAccessor::new(&resolved, raw_path).remove(resource, strict_remove)
        }
    }
}

/// An absent or blank path means the whole resource.
fn normalized_path(operation: &PatchOperation) -> Option<&str> {
    operation
        .path
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
}

fn apply_at_path(
    resource: &mut Resource,
    verb: PatchOpKind,
    raw_path: &str,
    value: &Value,
    schemas: &SchemaSet,
) -> PatchResult<()> {
    let path = PatchPath::parse(raw_path)?;
    let resolved = resolve(&path, schemas)?;
    let coerced = coerce_for_target(&resolved, value)?;
    authorize(&resolved, resource, raw_path)?;

    let accessor = AttributeAccessor::new(&resolved, raw_path);
    if verb == PatchOpKind::Add {
        accessor.add(resource, coerced)
    } else {
        accessor.replace(resource, coerced)
    }
}

/// Apply an add or replace without a path.
///
/// The value object's keys are attribute names or extension URNs; an
/// extension URN key descends one level and applies its object's keys
/// against that extension. Null values are skipped, matching how several
/// providers pad unset attributes.
fn apply_root(
    resource: &mut Resource,
    verb: PatchOpKind,
    value: &Value,
    schemas: &SchemaSet,
) -> PatchResult<()> {
    let Some(object) = value.as_object() else {
        return Err(PatchError::invalid_operation(format!(
            "a {verb} operation without a path requires an object value"
        )));
    };

    for (key, raw) in object {
        if raw.is_null() {
            continue;
        }
        if is_urn(key) {
            let Some(container) = raw.as_object() else {
                return Err(PatchError::invalid_value(
                    key.clone(),
                    "extension container value must be an object",
                ));
            };
            for (attribute, attribute_value) in container {
                if attribute_value.is_null() {
                    continue;
                }
                let qualified = format!("{key}:{attribute}");
                apply_root_attribute(resource, verb, &qualified, attribute_value, schemas)?;
            }
        } else {
            apply_root_attribute(resource, verb, key, raw, schemas)?;
        }
    }
    Ok(())
}

fn apply_root_attribute(
    resource: &mut Resource,
    verb: PatchOpKind,
    raw_path: &str,
    value: &Value,
    schemas: &SchemaSet,
) -> PatchResult<()> {
    let path = PatchPath::parse(raw_path)?;
    let resolved = resolve(&path, schemas)?;
    let coerced = coerce_for_target(&resolved, value)?;
    authorize(&resolved, resource, raw_path)?;

    let accessor = AttributeAccessor::new(&resolved, raw_path);
    if verb == PatchOpKind::Add {
        return accessor.add(resource, coerced);
    }
    // A no-path replace overwrites per attribute with no existence
    // requirement, so single-valued targets take the add behavior.
    match resolved.shape() {
        AttributeShape::SingleValuedScalar | AttributeShape::SingleValuedComplex => {
            accessor.add(resource, coerced)
        }
        AttributeShape::MultiValuedSimple | AttributeShape::MultiValuedComplex => {
            accessor.replace(resource, coerced)
        }
    }
}

/// Coerce the raw value against the narrowest resolved definition.
fn coerce_for_target(resolved: &ResolvedPath<'_>, value: &Value) -> PatchResult<Value> {
    match (resolved.sub_attribute, resolved.filter) {
        (Some(sub), _) => coerce_sub_attribute_value(resolved.attribute, sub, value),
        (None, Some(_)) => coerce_element_value(resolved.attribute, value),
        (None, None) => coerce_attribute_value(resolved.attribute, value),
    }
}

/// Enforce the target definition's mutability for every verb.
///
/// `readOnly` always refuses. `immutable` refuses once the target holds a
/// value; the initial write is legal.
fn authorize(
    resolved: &ResolvedPath<'_>,
    resource: &Resource,
    raw_path: &str,
) -> PatchResult<()> {
    let target = resolved.target_definition();
    match target.mutability {
        Mutability::ReadOnly => Err(PatchError::ReadOnly {
            attribute: target.name.clone(),
        }),
        Mutability::Immutable => {
            if AttributeAccessor::new(resolved, raw_path).get(resource).is_some() {
                Err(PatchError::Immutable {
                    attribute: target.name.clone(),
                })
            } else {
                Ok(())
            }
        }
        Mutability::ReadWrite | Mutability::WriteOnly => Ok(()),
    }
}

fn is_urn(key: &str) -> bool {
    key.get(..4)
        .is_some_and(|head| head.eq_ignore_ascii_case("urn:"))
}
