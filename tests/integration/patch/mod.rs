//! SCIM PATCH engine integration tests.
//!
//! Each submodule drives the full pipeline: envelope validation, path
//! resolution, coercion, mutability enforcement, mutation and the final
//! whole-resource validation pass.

pub mod atomicity;
pub mod errors;
pub mod tolerance;

use scim_patch::{PatchProcessor, PatchRequest, Resource, ScimError, SchemaSet};
use serde_json::{Value, json};

pub const PATCH_OP_URN: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

/// Wrap an operations array in the PatchOp envelope.
pub fn envelope(operations: Value) -> Value {
    json!({
        "schemas": [PATCH_OP_URN],
        "Operations": operations
    })
}

/// Deserialize a PATCH document the way a server's request layer would.
pub fn request(body: Value) -> PatchRequest {
    serde_json::from_value(body).expect("patch body did not deserialize")
}

/// Run a PATCH document against a User resource.
pub fn patch_user(resource: Resource, body: Value) -> Result<Resource, ScimError> {
    PatchProcessor::new(&SchemaSet::user()).apply(resource, &request(body))
}

/// Run a PATCH document against a User resource with strict removes.
pub fn patch_user_strict(resource: Resource, body: Value) -> Result<Resource, ScimError> {
    PatchProcessor::new(&SchemaSet::user())
        .with_strict_remove(true)
        .apply(resource, &request(body))
}

/// Run a PATCH document against a Group resource.
pub fn patch_group(resource: Resource, body: Value) -> Result<Resource, ScimError> {
    PatchProcessor::new(&SchemaSet::group()).apply(resource, &request(body))
}

pub const DEVICE_URN: &str = "urn:example:params:scim:schemas:core:2.0:Device";

/// A custom Device schema covering shapes the embedded User and Group
/// schemas lack: a unique multi-valued simple attribute (`serials`), a
/// non-unique one (`tags`) and a plain integer (`memoryGb`).
pub fn device_schema_set() -> SchemaSet {
    let schema = serde_json::from_value(json!({
        "id": DEVICE_URN,
        "name": "Device",
        "description": "Managed device",
        "attributes": [
            {
                "name": "schemas",
                "type": "string",
                "multiValued": true,
                "required": true,
                "caseExact": true,
                "mutability": "readWrite",
                "uniqueness": "none"
            },
            {
                "name": "id",
                "type": "string",
                "multiValued": false,
                "required": false,
                "caseExact": true,
                "mutability": "readOnly",
                "uniqueness": "server"
            },
            {
                "name": "serialNumber",
                "type": "string",
                "multiValued": false,
                "required": true,
                "caseExact": true,
                "mutability": "readWrite",
                "uniqueness": "server"
            },
            {
                "name": "serials",
                "type": "string",
                "multiValued": true,
                "required": false,
                "caseExact": true,
                "mutability": "readWrite",
                "uniqueness": "server"
            },
            {
                "name": "tags",
                "type": "string",
                "multiValued": true,
                "required": false,
                "caseExact": false,
                "mutability": "readWrite",
                "uniqueness": "none"
            },
            {
                "name": "memoryGb",
                "type": "integer",
                "multiValued": false,
                "required": false,
                "caseExact": false,
                "mutability": "readWrite",
                "uniqueness": "none"
            }
        ]
    }))
    .expect("device schema did not deserialize");
    SchemaSet::new(schema)
}

/// A minimal Device resource against [`device_schema_set`].
pub fn device(extra: Value) -> Resource {
    let mut data = json!({
        "schemas": [DEVICE_URN],
        "id": "dev-001",
        "serialNumber": "SN-12345"
    });
    if let (Some(map), Some(more)) = (data.as_object_mut(), extra.as_object()) {
        for (key, value) in more {
            map.insert(key.clone(), value.clone());
        }
    }
    Resource::from_json("Device", data).expect("device fixture is malformed")
}

/// Run a PATCH document against a Device resource.
pub fn patch_device(resource: Resource, body: Value) -> Result<Resource, ScimError> {
    PatchProcessor::new(&device_schema_set()).apply(resource, &request(body))
}
