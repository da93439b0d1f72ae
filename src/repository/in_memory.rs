//! In-memory repository for tests, examples and development.
//!
//! Thread-safe over a `tenant-free` two-level map, `resource_type` to
//! `id` to stored JSON. Persisting stamps SCIM metadata: `meta.created`
//! on first write, `meta.lastModified` on every write, and a
//! content-derived `meta.version` rendered as a weak ETag. A persist that
//! carries a version different from the stored one is refused, which gives
//! callers optimistic concurrency over the load-patch-persist cycle.

use crate::error::ValidationError;
use crate::repository::ResourceRepository;
use crate::resource::{RequestContext, Resource, ResourceVersion};
use chrono::Utc;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from the in-memory repository.
#[derive(Debug, Error)]
pub enum InMemoryRepositoryError {
    /// Incoming resource carries no id
    #[error("resource has no id")]
    MissingId,
    /// Stored and incoming versions disagree
    #[error(
        "version conflict on {resource_type} '{id}': stored {stored}, incoming {incoming}"
    )]
    VersionConflict {
        resource_type: String,
        id: String,
        stored: String,
        incoming: String,
    },
    /// Stored JSON no longer parses as a resource
    #[error("stored resource is malformed: {0}")]
    Malformed(#[from] ValidationError),
    /// Resource content could not be serialized for versioning
    #[error("failed to serialize resource content: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Thread-safe in-memory implementation of
/// [`ResourceRepository`](crate::repository::ResourceRepository).
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    // resource_type -> id -> data
    data: Arc<RwLock<HashMap<String, HashMap<String, Value>>>>,
}

impl InMemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a resource directly, without a version check. Intended for
    /// test and example setup.
    pub async fn seed(&self, mut resource: Resource) -> Result<Resource, InMemoryRepositoryError> {
        let id = required_id(&resource)?;
        stamp_meta(&mut resource, true)?;
        let mut guard = self.data.write().await;
        guard
            .entry(resource.resource_type().to_string())
            .or_default()
            .insert(id, resource.to_json());
        Ok(resource)
    }

    /// Total number of stored resources across all types.
    pub async fn count(&self) -> usize {
        let guard = self.data.read().await;
        guard.values().map(HashMap::len).sum()
    }

    /// Clear all data.
    pub async fn clear(&self) {
        let mut guard = self.data.write().await;
        guard.clear();
    }
}

impl ResourceRepository for InMemoryRepository {
    type Error = InMemoryRepositoryError;

    async fn load(
        &self,
        resource_type: &str,
        id: &str,
        _context: &RequestContext,
    ) -> Result<Option<Resource>, Self::Error> {
        let guard = self.data.read().await;
        let Some(stored) = guard
            .get(resource_type)
            .and_then(|resources| resources.get(id))
            .cloned()
        else {
            return Ok(None);
        };
        Ok(Some(Resource::from_json(resource_type, stored)?))
    }

    async fn persist(
        &self,
        mut resource: Resource,
        context: &RequestContext,
    ) -> Result<Resource, Self::Error> {
        let id = required_id(&resource)?;
        let resource_type = resource.resource_type().to_string();

        let mut guard = self.data.write().await;
        let slot = guard.entry(resource_type.clone()).or_default();

        let existing = slot.get(&id);
        if let Some(stored_version) = existing
            .and_then(|value| value.pointer("/meta/version"))
            .and_then(Value::as_str)
        {
            if let Some(incoming_version) = resource.meta_version() {
                if versions_differ(stored_version, incoming_version) {
                    return Err(InMemoryRepositoryError::VersionConflict {
                        resource_type,
                        id,
                        stored: stored_version.to_string(),
                        incoming: incoming_version.to_string(),
                    });
                }
            }
        }

        stamp_meta(&mut resource, existing.is_none())?;
        slot.insert(id.clone(), resource.to_json());
        debug!(
            "[{}] persisted {resource_type} '{id}'",
            context.request_id
        );
        Ok(resource)
    }
}

fn required_id(resource: &Resource) -> Result<String, InMemoryRepositoryError> {
    resource
        .get_id()
        .map(str::to_string)
        .ok_or(InMemoryRepositoryError::MissingId)
}

/// Refresh `meta` on the way to storage.
///
/// The version hashes the content with `meta.version` itself excluded,
/// keeping the token free of self-reference.
fn stamp_meta(resource: &mut Resource, creating: bool) -> Result<(), InMemoryRepositoryError> {
    let now = Utc::now().to_rfc3339();
    if resource.get_attribute("meta").and_then(|meta| meta.get("resourceType")).is_none() {
        resource.set_meta_value(
            "resourceType",
            Value::String(resource.resource_type().to_string()),
        );
    }
    if creating
        && resource
            .get_attribute("meta")
            .and_then(|meta| meta.get("created"))
            .is_none()
    {
        resource.set_meta_value("created", Value::String(now.clone()));
    }
    resource.set_meta_value("lastModified", Value::String(now));

    let mut content = resource.to_json();
    if let Some(meta) = content.get_mut("meta").and_then(Value::as_object_mut) {
        meta.remove("version");
    }
    let version = ResourceVersion::from_content(&serde_json::to_vec(&content)?);
    resource.set_meta_value("version", Value::String(version.to_etag()));
    Ok(())
}

fn versions_differ(stored: &str, incoming: &str) -> bool {
    match (
        stored.parse::<ResourceVersion>(),
        incoming.parse::<ResourceVersion>(),
    ) {
        (Ok(a), Ok(b)) => a != b,
        _ => stored != incoming,
    }
}
