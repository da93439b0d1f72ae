//! Ordered application of a whole patch document.
//!
//! The processor owns the all-or-nothing contract: operations apply in
//! array order against a working copy it takes by value, the first failure
//! discards that copy and returns only the classified error, and a final
//! whole-resource validation runs before the mutated copy is handed back.
//! Callers that keep their loaded resource therefore never observe a
//! partially patched state.

use crate::error::{PatchError, ScimError};
use crate::patch::executor::apply_operation;
use crate::patch::operations::{PatchOperation, PatchRequest};
use crate::resource::Resource;
use crate::schema::SchemaSet;
use log::{debug, warn};

/// Applies patch documents against resources of one schema set.
pub struct PatchProcessor<'a> {
    schemas: &'a SchemaSet,
    strict_remove: bool,
}

impl<'a> PatchProcessor<'a> {
    pub fn new(schemas: &'a SchemaSet) -> Self {
        Self {
            schemas,
            strict_remove: false,
        }
    }

    /// Fail removes that match nothing instead of absorbing them.
    pub fn with_strict_remove(mut self, strict: bool) -> Self {
        self.strict_remove = strict;
        self
    }

    /// Validate the request envelope, then apply every operation.
    pub fn apply(&self, resource: Resource, request: &PatchRequest) -> Result<Resource, ScimError> {
        if let Err(err) = request.validate() {
            warn!("patch envelope rejected: {err}");
            return Err(err.into());
        }
        self.apply_operations(resource, &request.operations)
    }

    /// Apply operations in order against the working copy.
    ///
    /// On success the mutated resource is re-validated as a whole against
    /// the schema set and returned. On failure the working copy is
    /// dropped; the error carries no resource.
    pub fn apply_operations(
        &self,
        mut resource: Resource,
        operations: &[PatchOperation],
    ) -> Result<Resource, ScimError> {
        let total = operations.len();
        for (index, operation) in operations.iter().enumerate() {
            debug!(
                "applying {} operation {}/{} at path '{}'",
                operation.op,
                index + 1,
                total,
                operation.path.as_deref().unwrap_or("")
            );
            if let Err(err) = apply_operation(
                &mut resource,
                operation,
                self.schemas,
                self.strict_remove,
            ) {
                warn!(
                    "patch operation {}/{} failed as {}: {}",
                    index + 1,
                    total,
                    err.scim_type().as_str(),
                    err
                );
                return Err(err.into());
            }
        }

        if let Err(err) = self.schemas.validate_resource(&resource) {
            let err = PatchError::Validation(err);
            warn!("patched resource failed schema validation: {err}");
            return Err(err.into());
        }
        Ok(resource)
    }
}
