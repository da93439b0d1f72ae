//! Patch request envelope and operation types.
//!
//! Wire format follows RFC 7644 Section 3.5.2: a `PatchOp` message carries
//! its message URN in `schemas` and a non-empty `Operations` array. The
//! operation verb is matched case-insensitively because Azure AD sends
//! `Add`/`Replace`/`Remove` with leading capitals.

use crate::error::{PatchError, PatchResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Message URN identifying a patch request body.
pub const PATCH_OP_URN: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

/// Patch operation verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOpKind {
    Add,
    Remove,
    Replace,
}

impl<'de> Deserialize<'de> for PatchOpKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.to_ascii_lowercase().as_str() {
            "add" => Ok(PatchOpKind::Add),
            "remove" => Ok(PatchOpKind::Remove),
            "replace" => Ok(PatchOpKind::Replace),
            _ => Err(serde::de::Error::unknown_variant(
                &raw,
                &["add", "remove", "replace"],
            )),
        }
    }
}

impl fmt::Display for PatchOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOpKind::Add => f.write_str("add"),
            PatchOpKind::Remove => f.write_str("remove"),
            PatchOpKind::Replace => f.write_str("replace"),
        }
    }
}

/// A single patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    /// Operation verb
    pub op: PatchOpKind,
    /// Attribute path the operation targets; absent means the whole
    /// resource for add and replace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Value to add or replace; must be absent for remove
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    /// Create an add operation.
    pub fn add(path: Option<&str>, value: Value) -> Self {
        Self {
            op: PatchOpKind::Add,
            path: path.map(str::to_string),
            value: Some(value),
        }
    }

    /// Create a replace operation.
    pub fn replace(path: Option<&str>, value: Value) -> Self {
        Self {
            op: PatchOpKind::Replace,
            path: path.map(str::to_string),
            value: Some(value),
        }
    }

    /// Create a remove operation targeting `path`.
    pub fn remove(path: &str) -> Self {
        Self {
            op: PatchOpKind::Remove,
            path: Some(path.to_string()),
            value: None,
        }
    }
}

/// A full patch request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchRequest {
    /// Message URNs; must include [`PATCH_OP_URN`]
    pub schemas: Vec<String>,
    /// Operations to apply, in order
    #[serde(rename = "Operations")]
    pub operations: Vec<PatchOperation>,
}

impl PatchRequest {
    /// Create a request with the correct message URN.
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self {
            schemas: vec![PATCH_OP_URN.to_string()],
            operations,
        }
    }

    /// Check the message envelope before touching any operation.
    ///
    /// A body without the `PatchOp` URN is not a patch message at all; an
    /// empty `Operations` array is a well-formed message asking for
    /// nothing, which is rejected rather than silently accepted.
    pub fn validate(&self) -> PatchResult<()> {
        if !self
            .schemas
            .iter()
            .any(|urn| urn.eq_ignore_ascii_case(PATCH_OP_URN))
        {
            return Err(PatchError::malformed_request(format!(
                "request body does not declare the patch message URN '{PATCH_OP_URN}'"
            )));
        }
        if self.operations.is_empty() {
            return Err(PatchError::invalid_operation(
                "Operations must contain at least one operation",
            ));
        }
        Ok(())
    }
}
