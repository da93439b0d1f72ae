//! Persistence boundary around the patch engine.
//!
//! The engine itself performs no I/O. This module defines the load and
//! persist seams the engine's callers plug storage into, plus
//! [`PatchService`], the load-patch-persist orchestration most servers
//! want: fetch the resource, run the document through a
//! [`PatchProcessor`], and hand the mutated copy back to the repository
//! only when every operation succeeded.
//!
//! # Example
//!
//! ```rust
//! use scim_patch::patch::{PatchOperation, PatchRequest};
//! use scim_patch::repository::{InMemoryRepository, PatchService};
//! use scim_patch::resource::{RequestContext, Resource};
//! use scim_patch::schema::SchemaSet;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryRepository::new();
//! let context = RequestContext::with_generated_id();
//!
//! repository.seed(Resource::from_json("User", json!({
//!     "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!     "id": "2819c223",
//!     "userName": "bjensen"
//! }))?).await?;
//!
//! let service = PatchService::new(repository);
//! let request = PatchRequest::new(vec![
//!     PatchOperation::add(Some("active"), json!(true)),
//! ]);
//! let patched = service
//!     .patch("User", "2819c223", &request, &SchemaSet::user(), &context)
//!     .await?;
//! assert_eq!(patched.get_attribute("active"), Some(&json!(true)));
//! # Ok(())
//! # }
//! ```

pub mod in_memory;

pub use in_memory::{InMemoryRepository, InMemoryRepositoryError};

use crate::error::ScimError;
use crate::patch::{PatchProcessor, PatchRequest};
use crate::resource::{RequestContext, Resource};
use crate::schema::SchemaSet;
use log::{debug, info};
use std::future::Future;
use thiserror::Error;

/// Storage seam for patchable resources.
///
/// Implementations own identity (`id` lookup), concurrency control and
/// metadata stamping; the engine never writes through this trait itself.
pub trait ResourceRepository: Send + Sync {
    /// The error type returned by repository operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a resource by type and id, `None` when absent.
    fn load(
        &self,
        resource_type: &str,
        id: &str,
        context: &RequestContext,
    ) -> impl Future<Output = Result<Option<Resource>, Self::Error>> + Send;

    /// Persist a mutated resource and return the stored representation,
    /// which may carry refreshed metadata.
    fn persist(
        &self,
        resource: Resource,
        context: &RequestContext,
    ) -> impl Future<Output = Result<Resource, Self::Error>> + Send;
}

/// Failures from the load-patch-persist flow.
#[derive(Debug, Error)]
pub enum PatchServiceError<E> {
    /// No resource with the requested type and id
    #[error("{resource_type} '{id}' not found")]
    NotFound { resource_type: String, id: String },
    /// The patch itself was rejected; carries the protocol error body
    #[error(transparent)]
    Scim(#[from] ScimError),
    /// The repository failed to load or persist
    #[error("repository failure: {0}")]
    Repository(#[source] E),
}

/// Load-patch-persist orchestration over any [`ResourceRepository`].
pub struct PatchService<R> {
    repository: R,
    strict_remove: bool,
}

impl<R: ResourceRepository> PatchService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            strict_remove: false,
        }
    }

    /// Fail removes that match nothing instead of absorbing them.
    pub fn with_strict_remove(mut self, strict: bool) -> Self {
        self.strict_remove = strict;
        self
    }

    /// Access the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Apply a patch document to the stored resource.
    ///
    /// The repository sees the mutated resource only after every operation
    /// and the final validation pass succeeded.
    pub async fn patch(
        &self,
        resource_type: &str,
        id: &str,
        request: &PatchRequest,
        schemas: &SchemaSet,
        context: &RequestContext,
    ) -> Result<Resource, PatchServiceError<R::Error>> {
        debug!(
            "[{}] patching {resource_type} '{id}' ({} operations)",
            context.request_id,
            request.operations.len()
        );

        let resource = self
            .repository
            .load(resource_type, id, context)
            .await
            .map_err(PatchServiceError::Repository)?
            .ok_or_else(|| PatchServiceError::NotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            })?;

        let processor = PatchProcessor::new(schemas).with_strict_remove(self.strict_remove);
        let patched = processor.apply(resource, request)?;

        let stored = self
            .repository
            .persist(patched, context)
            .await
            .map_err(PatchServiceError::Repository)?;

        info!(
            "[{}] patched {resource_type} '{id}'",
            context.request_id
        );
        Ok(stored)
    }
}
