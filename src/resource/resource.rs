//! Core SCIM resource representation.
//!
//! This module contains the main Resource struct: a JSON-backed attribute
//! bag tagged with its resource type. The engine is schema-driven, so
//! there are no static Rust structs per resource type; all structure and
//! constraint knowledge lives in the [`SchemaSet`](crate::schema::SchemaSet).
//!
//! SCIM attribute names are case-insensitive while JSON keys are not, so
//! lookups here match keys case-insensitively and writes reuse the stored
//! spelling when one exists.

use crate::error::{ValidationError, ValidationResult};
use serde_json::{Map, Value};

/// Generic SCIM resource representation.
///
/// A resource is a structured data object with a type identifier and JSON
/// data. Patch operations edit the data in place; schema validation is the
/// processor's job, not this type's.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    resource_type: String,
    data: Map<String, Value>,
}

impl Resource {
    /// Create a resource from a JSON value, which must be an object.
    ///
    /// # Example
    /// ```rust
    /// use scim_patch::resource::Resource;
    /// use serde_json::json;
    ///
    /// let user = Resource::from_json("User", json!({
    ///     "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
    ///     "userName": "jdoe"
    /// })).unwrap();
    /// assert_eq!(user.resource_type(), "User");
    /// ```
    pub fn from_json(resource_type: impl Into<String>, data: Value) -> ValidationResult<Self> {
        match data {
            Value::Object(map) => Ok(Self {
                resource_type: resource_type.into(),
                data: map,
            }),
            other => Err(ValidationError::custom(format!(
                "Resource must be a JSON object, got {}",
                crate::schema::validation::json_type_name(&other)
            ))),
        }
    }

    /// The SCIM resource type identifier, e.g. "User".
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// The underlying attribute map.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Mutable access to the underlying attribute map.
    pub fn data_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }

    /// Consume the resource and return its JSON form.
    pub fn into_json(self) -> Value {
        Value::Object(self.data)
    }

    /// The resource's JSON form, cloned.
    pub fn to_json(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// Get the unique identifier of this resource.
    pub fn get_id(&self) -> Option<&str> {
        self.get_attribute("id")?.as_str()
    }

    /// The schema URNs listed on this resource, empty when absent or
    /// malformed.
    pub fn get_schemas(&self) -> Vec<&str> {
        self.get_attribute("schemas")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Find the stored key matching an attribute name, case-insensitively.
    pub fn find_key(&self, name: &str) -> Option<&str> {
        self.data
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Get an attribute value by name (case-insensitive).
    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.data
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Set an attribute value, reusing the stored key spelling when the
    /// attribute already exists.
    pub fn set_attribute(&mut self, name: &str, value: Value) {
        match self.find_key(name).map(str::to_string) {
            Some(key) => {
                self.data.insert(key, value);
            }
            None => {
                self.data.insert(name.to_string(), value);
            }
        }
    }

    /// Remove an attribute by name (case-insensitive), returning the old
    /// value if one was stored.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        let key = self.find_key(name)?.to_string();
        self.data.remove(&key)
    }

    /// The extension container for a schema URN, if present and an object.
    pub fn extension(&self, urn: &str) -> Option<&Map<String, Value>> {
        self.get_attribute(urn)?.as_object()
    }

    /// Mutable extension container for a schema URN, if present and an
    /// object.
    pub fn extension_mut(&mut self, urn: &str) -> Option<&mut Map<String, Value>> {
        let key = self.find_key(urn)?.to_string();
        self.data.get_mut(&key)?.as_object_mut()
    }

    /// Get or create the extension container for a schema URN.
    ///
    /// A stored non-object value under the URN is replaced by an empty
    /// container, since nothing else can hold extension attributes.
    pub fn extension_or_create(&mut self, urn: &str) -> &mut Map<String, Value> {
        let key = self
            .find_key(urn)
            .map(str::to_string)
            .unwrap_or_else(|| urn.to_string());
        let entry = self
            .data
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry.as_object_mut() {
            Some(map) => map,
            // Unreachable: the value was just forced to an object.
            None => unreachable!("extension container is an object"),
        }
    }

    /// Record a schema URN in the `schemas` array if it is not already
    /// listed (case-insensitive).
    ///
    /// Extension data is only valid while its URN is declared, so writes
    /// into an extension container go through this. A missing or
    /// non-array `schemas` value is left alone for validation to flag.
    pub fn declare_schema(&mut self, urn: &str) {
        let Some(key) = self.find_key("schemas").map(str::to_string) else {
            return;
        };
        let Some(schemas) = self.data.get_mut(&key).and_then(Value::as_array_mut) else {
            return;
        };
        let listed = schemas
            .iter()
            .filter_map(Value::as_str)
            .any(|entry| entry.eq_ignore_ascii_case(urn));
        if !listed {
            schemas.push(Value::String(urn.to_string()));
        }
    }

    /// The stored `meta.version` value, if any.
    pub fn meta_version(&self) -> Option<&str> {
        self.get_attribute("meta")?.get("version")?.as_str()
    }

    /// Set one field of the `meta` complex attribute, creating `meta` as
    /// needed.
    pub fn set_meta_value(&mut self, field: &str, value: Value) {
        let meta = self
            .data
            .entry("meta".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !meta.is_object() {
            *meta = Value::Object(Map::new());
        }
        if let Some(map) = meta.as_object_mut() {
            map.insert(field.to_string(), value);
        }
    }
}
