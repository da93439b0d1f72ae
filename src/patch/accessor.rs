//! Uniform read and mutation capabilities over the four attribute shapes.
//!
//! An accessor binds a resolved path to one operation's worth of
//! mutations. Mutations are computed out of place and committed with a
//! single insert, so a failure partway through a multi-element change
//! never leaves the resource half mutated. Writes land under the
//! extension container when the path carries one; the container is
//! created on demand for add and replace and never created by remove.
//!
//! Stored JSON keys are matched case-insensitively; newly inserted keys
//! use the schema's canonical spelling.

use crate::error::{PatchError, PatchResult};
use crate::patch::resolver::ResolvedPath;
use crate::resource::Resource;
use crate::schema::{AttributeShape, Uniqueness};
use serde_json::{Map, Value};

/// Capability set `{get, add, replace, remove}` at one resolved path.
pub struct AttributeAccessor<'a> {
    resolved: &'a ResolvedPath<'a>,
    /// Path as the client wrote it, for error detail
    path: &'a str,
}

impl<'a> AttributeAccessor<'a> {
    pub fn new(resolved: &'a ResolvedPath<'a>, path: &'a str) -> Self {
        Self { resolved, path }
    }

    /// Current value at the path, `None` when absent.
    ///
    /// Filtered and sub-attribute paths on multi-valued attributes return
    /// the matched values as an array; an empty match is `None`.
    pub fn get(&self, resource: &Resource) -> Option<Value> {
        let current = self.current(resource)?;
        match self.resolved.shape() {
            AttributeShape::SingleValuedScalar | AttributeShape::MultiValuedSimple => {
                Some(current.clone())
            }
            AttributeShape::SingleValuedComplex => match self.resolved.sub_attribute {
                None => Some(current.clone()),
                Some(sub) => {
                    let value = get_ci(current.as_object()?, &sub.name)?;
                    (!value.is_null()).then(|| value.clone())
                }
            },
            AttributeShape::MultiValuedComplex => {
                let items = current.as_array()?;
                let matched: Vec<&Value> = items
                    .iter()
                    .filter(|element| self.element_matches(element))
                    .collect();
                if matched.is_empty() {
                    return None;
                }
                match self.resolved.sub_attribute {
                    None => Some(Value::Array(matched.into_iter().cloned().collect())),
                    Some(sub) => {
                        let values: Vec<Value> = matched
                            .iter()
                            .filter_map(|element| element.as_object())
                            .filter_map(|object| get_ci(object, &sub.name))
                            .filter(|value| !value.is_null())
                            .cloned()
                            .collect();
                        if values.is_empty() {
                            None
                        } else {
                            Some(Value::Array(values))
                        }
                    }
                }
            }
        }
    }

    /// Apply an add. `value` must already be coerced.
    pub fn add(&self, resource: &mut Resource, value: Value) -> PatchResult<()> {
        match self.resolved.shape() {
            AttributeShape::SingleValuedScalar => {
                self.commit(resource, value);
                Ok(())
            }
            AttributeShape::SingleValuedComplex => match self.resolved.sub_attribute {
                None => {
                    self.commit(resource, value);
                    Ok(())
                }
                Some(sub) => {
                    let mut object = self
                        .current(resource)
                        .and_then(Value::as_object)
                        .cloned()
                        .unwrap_or_default();
                    insert_ci(&mut object, &sub.name, value);
                    self.commit(resource, Value::Object(object));
                    Ok(())
                }
            },
            AttributeShape::MultiValuedSimple => self.append_simple(resource, value),
            AttributeShape::MultiValuedComplex => {
                match (self.resolved.filter, self.resolved.sub_attribute) {
                    (None, None) => {
                        let mut items = self.current_array(resource);
                        items.extend(into_elements(value));
                        self.commit(resource, Value::Array(items));
                        Ok(())
                    }
                    (Some(_), None) => self.merge_into_matched(resource, value),
                    (_, Some(_)) => self.set_sub_on_matched(resource, value),
                }
            }
        }
    }

    /// Apply a replace. `value` must already be coerced.
    ///
    /// Differs from add on unfiltered paths: a single-valued target must
    /// already exist, and multi-valued arrays are overwritten rather than
    /// appended to.
    pub fn replace(&self, resource: &mut Resource, value: Value) -> PatchResult<()> {
        match self.resolved.shape() {
            AttributeShape::SingleValuedScalar => {
                if self.current(resource).is_none() {
                    return Err(PatchError::no_target(self.path));
                }
                self.commit(resource, value);
                Ok(())
            }
            AttributeShape::SingleValuedComplex => match self.resolved.sub_attribute {
                None => {
                    if self.current(resource).is_none() {
                        return Err(PatchError::no_target(self.path));
                    }
                    self.commit(resource, value);
                    Ok(())
                }
                Some(sub) => {
                    let mut object = match self.current(resource).and_then(Value::as_object) {
                        Some(object) if get_ci(object, &sub.name).is_some_and(|v| !v.is_null()) => {
                            object.clone()
                        }
                        _ => return Err(PatchError::no_target(self.path)),
                    };
                    insert_ci(&mut object, &sub.name, value);
                    self.commit(resource, Value::Object(object));
                    Ok(())
                }
            },
            AttributeShape::MultiValuedSimple => {
                self.commit(resource, value);
                Ok(())
            }
            AttributeShape::MultiValuedComplex => {
                match (self.resolved.filter, self.resolved.sub_attribute) {
                    (None, None) => {
                        self.commit(resource, value);
                        Ok(())
                    }
                    (Some(_), None) => self.merge_into_matched(resource, value),
                    (_, Some(_)) => self.set_sub_on_matched(resource, value),
                }
            }
        }
    }

    /// Apply a remove.
    ///
    /// A remove that finds nothing succeeds silently unless `strict` is
    /// set, in which case it fails with a no-target error.
    pub fn remove(&self, resource: &mut Resource, strict: bool) -> PatchResult<()> {
        let nothing_matched = || -> PatchResult<()> {
            if strict {
                Err(PatchError::no_target(self.path))
            } else {
                Ok(())
            }
        };

        match self.resolved.shape() {
            AttributeShape::SingleValuedScalar | AttributeShape::MultiValuedSimple => {
                if self.current(resource).is_none() {
                    return nothing_matched();
                }
                self.remove_entry(resource);
                Ok(())
            }
            AttributeShape::SingleValuedComplex => match self.resolved.sub_attribute {
                None => {
                    if self.current(resource).is_none() {
                        return nothing_matched();
                    }
                    self.remove_entry(resource);
                    Ok(())
                }
                Some(sub) => {
                    let Some(mut object) =
                        self.current(resource).and_then(Value::as_object).cloned()
                    else {
                        return nothing_matched();
                    };
                    if remove_ci(&mut object, &sub.name).is_none() {
                        return nothing_matched();
                    }
                    self.commit(resource, Value::Object(object));
                    Ok(())
                }
            },
            AttributeShape::MultiValuedComplex => {
                match (self.resolved.filter, self.resolved.sub_attribute) {
                    (None, None) => {
                        if self.current(resource).is_none() {
                            return nothing_matched();
                        }
                        self.remove_entry(resource);
                        Ok(())
                    }
                    (Some(_), None) => {
                        let items = self.current_array(resource);
                        let (matched, remaining): (Vec<Value>, Vec<Value>) = items
                            .into_iter()
                            .partition(|element| self.element_matches(element));
                        if matched.is_empty() {
                            return nothing_matched();
                        }
                        if remaining.is_empty() {
                            self.remove_entry(resource);
                        } else {
                            self.commit(resource, Value::Array(remaining));
                        }
                        Ok(())
                    }
                    (_, Some(sub)) => {
                        let mut items = self.current_array(resource);
                        let mut matched = 0;
                        for element in items.iter_mut() {
                            if !self.element_matches(element) {
                                continue;
                            }
                            matched += 1;
                            if let Some(object) = element.as_object_mut() {
                                remove_ci(object, &sub.name);
                            }
                        }
                        if matched == 0 {
                            return nothing_matched();
                        }
                        self.commit(resource, Value::Array(items));
                        Ok(())
                    }
                }
            }
        }
    }

    /// Append to a multi-valued simple attribute, skipping values already
    /// present and failing on duplicates when the attribute declares
    /// uniqueness.
    fn append_simple(&self, resource: &mut Resource, value: Value) -> PatchResult<()> {
        let definition = self.resolved.attribute;
        let mut items = self.current_array(resource);
        for element in into_elements(value) {
            let already_present = items
                .iter()
                .any(|existing| scalar_equal(existing, &element, definition.case_exact));
            if !already_present {
                items.push(element);
                continue;
            }
            if definition.uniqueness != Uniqueness::None {
                return Err(PatchError::DuplicateValue {
                    attribute: definition.name.clone(),
                    value: render_scalar(&element),
                });
            }
        }
        self.commit(resource, Value::Array(items));
        Ok(())
    }

    /// Merge an object's keys into every element matched by the filter.
    fn merge_into_matched(&self, resource: &mut Resource, value: Value) -> PatchResult<()> {
        let Some(merge) = value.as_object() else {
            return Err(PatchError::invalid_value(
                self.path,
                "value for a filtered path must be a complex object",
            ));
        };
        let mut items = self.current_array(resource);
        let mut matched = 0;
        for element in items.iter_mut() {
            if !self.element_matches(element) {
                continue;
            }
            matched += 1;
            if let Some(target) = element.as_object_mut() {
                for (key, sub_value) in merge {
                    insert_ci(target, key, sub_value.clone());
                }
            }
        }
        if matched == 0 {
            return Err(PatchError::no_target(self.path));
        }
        self.commit(resource, Value::Array(items));
        Ok(())
    }

    /// Set the resolved sub-attribute on every matched element; an absent
    /// filter matches all elements.
    fn set_sub_on_matched(&self, resource: &mut Resource, value: Value) -> PatchResult<()> {
        let sub = self
            .resolved
            .sub_attribute
            .ok_or_else(|| PatchError::invalid_operation("sub-attribute path required"))?;
        let mut items = self.current_array(resource);
        let mut matched = 0;
        for element in items.iter_mut() {
            if !self.element_matches(element) {
                continue;
            }
            if let Some(object) = element.as_object_mut() {
                matched += 1;
                insert_ci(object, &sub.name, value.clone());
            }
        }
        if matched == 0 {
            return Err(PatchError::no_target(self.path));
        }
        self.commit(resource, Value::Array(items));
        Ok(())
    }

    fn element_matches(&self, element: &Value) -> bool {
        match self.resolved.filter {
            Some(filter) => filter.matches(element, self.resolved.filter_case_exact()),
            None => true,
        }
    }

    /// The stored top-level value for the resolved attribute, nulls
    /// treated as absent.
    fn current<'r>(&self, resource: &'r Resource) -> Option<&'r Value> {
        let container = match self.resolved.schema_urn {
            Some(urn) => resource.extension(urn)?,
            None => resource.data(),
        };
        get_ci(container, &self.resolved.attribute.name).filter(|value| !value.is_null())
    }

    /// The stored value as an owned array; absent or non-array stored
    /// values yield an empty one.
    fn current_array(&self, resource: &Resource) -> Vec<Value> {
        self.current(resource)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    /// Write the whole attribute value back, creating the extension
    /// container when needed.
    fn commit(&self, resource: &mut Resource, value: Value) {
        match self.resolved.schema_urn {
            Some(urn) => {
                insert_ci(
                    resource.extension_or_create(urn),
                    &self.resolved.attribute.name,
                    value,
                );
                resource.declare_schema(urn);
            }
            None => resource.set_attribute(&self.resolved.attribute.name, value),
        }
    }

    /// Delete the whole attribute entry. Never creates a container.
    fn remove_entry(&self, resource: &mut Resource) {
        match self.resolved.schema_urn {
            Some(urn) => {
                if let Some(container) = resource.extension_mut(urn) {
                    remove_ci(container, &self.resolved.attribute.name);
                }
            }
            None => {
                resource.remove_attribute(&self.resolved.attribute.name);
            }
        }
    }
}

/// Owned view of a value as multi-valued elements, wrapping a bare value.
fn into_elements(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn get_ci<'r>(map: &'r Map<String, Value>, name: &str) -> Option<&'r Value> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Insert reusing the stored key spelling when one exists.
fn insert_ci(map: &mut Map<String, Value>, name: &str, value: Value) {
    match map.keys().find(|key| key.eq_ignore_ascii_case(name)).cloned() {
        Some(existing) => map.insert(existing, value),
        None => map.insert(name.to_string(), value),
    };
}

fn remove_ci(map: &mut Map<String, Value>, name: &str) -> Option<Value> {
    let key = map.keys().find(|key| key.eq_ignore_ascii_case(name)).cloned()?;
    map.remove(&key)
}

fn scalar_equal(a: &Value, b: &Value, case_exact: bool) -> bool {
    match (a, b) {
        (Value::String(left), Value::String(right)) if !case_exact => {
            left.eq_ignore_ascii_case(right)
        }
        _ => a == b,
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
