//! Content-based resource versioning.
//!
//! A [`ResourceVersion`] is an opaque token derived from resource content,
//! used by repositories to detect conflicting concurrent updates and
//! stamped into `meta.version`. It renders as a weak HTTP ETag and parses
//! back from either the raw or the ETag form.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Opaque version token for a resource.
///
/// Two resources with identical content always produce the same version,
/// so comparing versions answers "has this changed" without field-level
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceVersion {
    opaque: String,
}

impl ResourceVersion {
    /// Compute the version of serialized resource content.
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let hash = hasher.finalize();
        // First 8 bytes keep ETags short while remaining collision-resistant
        // enough for change detection.
        Self {
            opaque: BASE64.encode(&hash[..8]),
        }
    }

    /// Wrap a pre-existing opaque version string.
    pub fn from_opaque(opaque: impl Into<String>) -> Self {
        Self {
            opaque: opaque.into(),
        }
    }

    /// The raw opaque token.
    pub fn as_str(&self) -> &str {
        &self.opaque
    }

    /// Render as a weak HTTP ETag, e.g. `W/"3Kkjk9PP1vc="`.
    pub fn to_etag(&self) -> String {
        format!("W/\"{}\"", self.opaque)
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.opaque)
    }
}

/// Error parsing a version token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid version format: {value}")]
pub struct VersionParseError {
    value: String,
}

impl FromStr for ResourceVersion {
    type Err = VersionParseError;

    /// Accepts the raw opaque form, a weak ETag (`W/"..."`) or a strong
    /// ETag (`"..."`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionParseError {
            value: s.to_string(),
        };

        let opaque = if let Some(rest) = s.strip_prefix("W/\"") {
            rest.strip_suffix('"').ok_or_else(invalid)?
        } else if let Some(rest) = s.strip_prefix('"') {
            rest.strip_suffix('"').ok_or_else(invalid)?
        } else {
            s
        };

        if opaque.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            opaque: opaque.to_string(),
        })
    }
}
