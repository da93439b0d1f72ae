//! Error types for SCIM patch processing.
//!
//! Failures inside the engine are represented by [`PatchError`], with
//! [`ValidationError`] covering whole-resource validation after a patch
//! document has been applied. At the protocol boundary every failure is
//! classified into an RFC 7644 `scimType` discriminator and rendered as a
//! [`ScimError`] response body with HTTP status 400.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema URN carried by every SCIM error response body.
pub const ERROR_MESSAGE_URN: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

/// RFC 7644 Section 3.12 `scimType` discriminators.
///
/// The set is closed by the RFC. The patch engine produces `InvalidFilter`,
/// `Uniqueness`, `Mutability`, `InvalidSyntax`, `InvalidPath`, `NoTarget`
/// and `InvalidValue`; the remaining variants exist because this type is the
/// crate's protocol surface and responses from other SCIM endpoints
/// deserialize into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScimErrorType {
    /// Filter is malformed or not applicable to the target
    InvalidFilter,
    /// Filter would match too many results
    TooMany,
    /// Value violates a uniqueness constraint
    Uniqueness,
    /// Mutation not permitted by the attribute's mutability
    Mutability,
    /// Request body or path is syntactically malformed
    InvalidSyntax,
    /// Path does not designate a known attribute
    InvalidPath,
    /// Path is valid but designates nothing on this resource
    NoTarget,
    /// Value is the wrong type or fails schema validation
    InvalidValue,
    /// Requested resource version is invalid
    InvalidVers,
    /// Request touches data the client may not see
    Sensitive,
}

impl ScimErrorType {
    /// The camelCase wire form of this discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidFilter => "invalidFilter",
            Self::TooMany => "tooMany",
            Self::Uniqueness => "uniqueness",
            Self::Mutability => "mutability",
            Self::InvalidSyntax => "invalidSyntax",
            Self::InvalidPath => "invalidPath",
            Self::NoTarget => "noTarget",
            Self::InvalidValue => "invalidValue",
            Self::InvalidVers => "invalidVers",
            Self::Sensitive => "sensitive",
        }
    }
}

impl fmt::Display for ScimErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RFC 7644 Section 3.12 error response body.
///
/// `status` is a number in this API but serializes as a string (`"400"`),
/// which is what the RFC's wire format requires. Deserialization accepts
/// either form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScimError {
    /// Always contains exactly [`ERROR_MESSAGE_URN`]
    pub schemas: Vec<String>,
    /// SCIM error type discriminator, present for 400-class failures
    #[serde(rename = "scimType", skip_serializing_if = "Option::is_none")]
    pub scim_type: Option<ScimErrorType>,
    /// Human-readable description of the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// HTTP status code
    #[serde(with = "status_code")]
    pub status: u16,
}

impl ScimError {
    /// Create an error response with the given status and no discriminator.
    pub fn new(status: u16) -> Self {
        Self {
            schemas: vec![ERROR_MESSAGE_URN.to_string()],
            scim_type: None,
            detail: None,
            status,
        }
    }

    /// Create a 400 response with a discriminator and detail message.
    pub fn bad_request(scim_type: ScimErrorType, detail: impl Into<String>) -> Self {
        Self {
            schemas: vec![ERROR_MESSAGE_URN.to_string()],
            scim_type: Some(scim_type),
            detail: Some(detail.into()),
            status: 400,
        }
    }
}

impl fmt::Display for ScimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SCIM error {}", self.status)?;
        if let Some(scim_type) = &self.scim_type {
            write!(f, " ({scim_type})")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ScimError {}

/// Serialize `status` as the string the RFC requires; accept string or
/// number on the way in.
mod status_code {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(status: &u16, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&status.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u16, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StatusRepr {
            Number(u16),
            Text(String),
        }

        match StatusRepr::deserialize(deserializer)? {
            StatusRepr::Number(n) => Ok(n),
            StatusRepr::Text(s) => s
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid status code '{s}'"))),
        }
    }
}

/// Failures raised while resolving or applying a patch operation.
///
/// Each variant corresponds to one distinguishable failure kind, so the
/// mapping to a `scimType` in [`PatchError::scim_type`] is a total match
/// with no fallthrough. The `Display` output of a variant becomes the
/// `detail` of the resulting [`ScimError`].
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// Path string failed to tokenize or parse
    #[error("Invalid path syntax at position {position}: {reason}")]
    PathSyntax { position: usize, reason: String },

    /// Value filter body failed to parse
    #[error("Invalid value filter: {reason}")]
    FilterSyntax { reason: String },

    /// Filter used a comparator other than equality
    #[error("Unsupported filter operator '{op}', only 'eq' is supported")]
    UnsupportedFilterOperator { op: String },

    /// Filter compares a sub-attribute the target does not declare
    #[error("Filter sub-attribute '{sub_attribute}' is not declared on '{attribute}'")]
    FilterAttributeUnknown {
        attribute: String,
        sub_attribute: String,
    },

    /// Filter applied to an attribute that is not multi-valued complex
    #[error("Attribute '{attribute}' does not support value filters")]
    FilterNotApplicable { attribute: String },

    /// Attribute name not declared in any schema of the set
    #[error("Unknown attribute '{attribute}'")]
    UnknownAttribute { attribute: String },

    /// Path carried a schema URN the set does not contain
    #[error("Unknown schema URN '{urn}'")]
    UnknownSchemaUrn { urn: String },

    /// Sub-attribute not declared on the target attribute
    #[error("Unknown sub-attribute '{sub_attribute}' on attribute '{attribute}'")]
    UnknownSubAttribute {
        attribute: String,
        sub_attribute: String,
    },

    /// Sub-attribute path on a non-complex attribute
    #[error("Attribute '{attribute}' is not complex and has no sub-attributes")]
    NotComplex { attribute: String },

    /// Remove operation arrived without a path
    #[error("Remove operations require a path")]
    RemoveWithoutPath,

    /// Path is valid but designates nothing on this resource
    #[error("No target found for path '{path}'")]
    NoTarget { path: String },

    /// Write to an attribute declared readOnly
    #[error("Attribute '{attribute}' is read-only")]
    ReadOnly { attribute: String },

    /// Overwrite or removal of an immutable attribute that already has a value
    #[error("Attribute '{attribute}' is immutable and already has a value")]
    Immutable { attribute: String },

    /// Duplicate value on an attribute declaring server or global uniqueness
    #[error("Value '{value}' already exists on unique attribute '{attribute}'")]
    DuplicateValue { attribute: String, value: String },

    /// Value could not be coerced to the attribute's declared type
    #[error("Invalid value for '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    /// Reference-typed value that is not a URI
    #[error("Attribute '{path}' has malformed URI value '{value}'")]
    ReferenceSyntax { path: String, value: String },

    /// PatchOp envelope is structurally malformed
    #[error("Malformed patch request: {reason}")]
    MalformedRequest { reason: String },

    /// Operation violates a structural rule (missing or forbidden value)
    #[error("Invalid patch operation: {reason}")]
    InvalidOperation { reason: String },

    /// Patched resource failed whole-resource validation
    #[error("Patched resource failed validation: {0}")]
    Validation(#[from] ValidationError),
}

impl PatchError {
    /// Create a path syntax error at a byte position.
    pub fn path_syntax(position: usize, reason: impl Into<String>) -> Self {
        Self::PathSyntax {
            position,
            reason: reason.into(),
        }
    }

    /// Create a filter syntax error.
    pub fn filter_syntax(reason: impl Into<String>) -> Self {
        Self::FilterSyntax {
            reason: reason.into(),
        }
    }

    /// Create an unknown attribute error.
    pub fn unknown_attribute(attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            attribute: attribute.into(),
        }
    }

    /// Create a no-target error for a path.
    pub fn no_target(path: impl Into<String>) -> Self {
        Self::NoTarget { path: path.into() }
    }

    /// Create a coercion failure for a path.
    pub fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed-envelope error.
    pub fn malformed_request(reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            reason: reason.into(),
        }
    }

    /// Create a structural operation error.
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }

    /// Map this failure to its RFC 7644 `scimType` discriminator.
    ///
    /// The match is total over the enum so every failure kind has exactly
    /// one documented classification.
    pub fn scim_type(&self) -> ScimErrorType {
        match self {
            Self::PathSyntax { .. } | Self::ReferenceSyntax { .. } | Self::MalformedRequest { .. } => {
                ScimErrorType::InvalidSyntax
            }
            Self::UnknownAttribute { .. }
            | Self::UnknownSchemaUrn { .. }
            | Self::UnknownSubAttribute { .. }
            | Self::NotComplex { .. }
            | Self::FilterNotApplicable { .. } => ScimErrorType::InvalidPath,
            Self::FilterSyntax { .. }
            | Self::UnsupportedFilterOperator { .. }
            | Self::FilterAttributeUnknown { .. } => ScimErrorType::InvalidFilter,
            Self::NoTarget { .. } | Self::RemoveWithoutPath => ScimErrorType::NoTarget,
            Self::ReadOnly { .. } | Self::Immutable { .. } => ScimErrorType::Mutability,
            Self::DuplicateValue { .. } => ScimErrorType::Uniqueness,
            Self::InvalidValue { .. } | Self::InvalidOperation { .. } | Self::Validation(_) => {
                ScimErrorType::InvalidValue
            }
        }
    }

    /// HTTP status for this failure. Patch failures are client errors.
    pub fn status(&self) -> u16 {
        400
    }
}

impl From<PatchError> for ScimError {
    fn from(err: PatchError) -> Self {
        ScimError {
            schemas: vec![ERROR_MESSAGE_URN.to_string()],
            scim_type: Some(err.scim_type()),
            detail: Some(err.to_string()),
            status: err.status(),
        }
    }
}

/// Validation errors for schema compliance checking.
///
/// These errors occur when a patched resource doesn't conform to its
/// schemas, providing detailed information about what rule was violated.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Missing schemas attribute
    #[error("Missing required 'schemas' attribute")]
    MissingSchemas,

    /// Schemas attribute is not an array (null included)
    #[error("'schemas' must be an array of schema URIs")]
    InvalidSchemasType,

    /// Empty schemas array
    #[error("'schemas' array cannot be empty")]
    EmptySchemas,

    /// Schemas entry is not a string
    #[error("'schemas' entries must be strings")]
    InvalidSchemaEntry,

    /// Duplicate schema URI
    #[error("Duplicate schema URI: {uri}")]
    DuplicateSchemaUri { uri: String },

    /// Unknown schema URI
    #[error("Unknown schema URI: {uri}")]
    UnknownSchemaUri { uri: String },

    /// Schemas does not include the base schema
    #[error("'schemas' must include the base schema {uri}")]
    MissingBaseSchema { uri: String },

    /// Extension data present without its URN in schemas
    #[error("Extension data for '{uri}' is not declared in 'schemas'")]
    UndeclaredExtension { uri: String },

    /// Extension container is not a JSON object
    #[error("Extension data for '{uri}' must be a JSON object")]
    InvalidExtensionContainer { uri: String },

    /// Required attribute is missing
    #[error("Required attribute '{attribute}' is missing")]
    MissingRequiredAttribute { attribute: String },

    /// Attribute value doesn't match expected type
    #[error("Attribute '{attribute}' has invalid type, expected {expected}, got {actual}")]
    InvalidDataType {
        attribute: String,
        expected: String,
        actual: String,
    },

    /// Multi-valued attribute provided as single value
    #[error("Attribute '{attribute}' must be multi-valued (array)")]
    ExpectedMultiValue { attribute: String },

    /// Single-valued attribute provided as array
    #[error("Attribute '{attribute}' must be single-valued (not array)")]
    ExpectedSingleValue { attribute: String },

    /// Invalid value for attribute with canonical values
    #[error("Attribute '{attribute}' has invalid value '{value}', allowed values: {allowed:?}")]
    InvalidCanonicalValue {
        attribute: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Unknown attribute in resource
    #[error("Unknown attribute '{attribute}' in schema '{schema_id}'")]
    UnknownAttribute {
        attribute: String,
        schema_id: String,
    },

    /// Invalid datetime format
    #[error("Attribute '{attribute}' has invalid datetime format: {value}")]
    InvalidDateTimeFormat { attribute: String, value: String },

    /// Invalid binary data
    #[error("Attribute '{attribute}' has invalid binary data: {value}")]
    InvalidBinaryData { attribute: String, value: String },

    /// Invalid reference URI
    #[error("Attribute '{attribute}' has invalid reference URI: {uri}")]
    InvalidReferenceUri { attribute: String, uri: String },

    /// General validation error with custom message
    #[error("Validation failed: {message}")]
    Custom { message: String },
}

impl ValidationError {
    /// Create a missing required attribute error
    pub fn missing_required(attribute: impl Into<String>) -> Self {
        Self::MissingRequiredAttribute {
            attribute: attribute.into(),
        }
    }

    /// Create an invalid data type error
    pub fn invalid_type(
        attribute: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::InvalidDataType {
            attribute: attribute.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a custom validation error
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

/// Result type for patch operations
pub type PatchResult<T> = Result<T, PatchError>;
/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
