//! Test data builders for PATCH targets.
//!
//! Fluent builders over the RFC 7643 Section 8 example resources. Each
//! builder hands out plain JSON so tests can bend the data into whatever
//! shape a case needs, plus a `build_resource` shortcut for the common
//! valid starting point.

use scim_patch::Resource;
use serde_json::{Value, json};

pub const USER_URN: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const GROUP_URN: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
pub const ENTERPRISE_URN: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

/// Builder for User resources.
#[derive(Debug, Clone)]
pub struct UserBuilder {
    data: Value,
}

impl UserBuilder {
    /// Minimal valid User: schemas, id, userName.
    pub fn new() -> Self {
        Self {
            data: json!({
                "schemas": [USER_URN],
                "id": "2819c223-7f76-453a-919d-413861904646",
                "userName": "bjensen@example.com"
            }),
        }
    }

    /// The RFC 7643 Section 8.2 profile: name, emails, phone numbers.
    pub fn new_full() -> Self {
        Self {
            data: json!({
                "schemas": [USER_URN],
                "id": "2819c223-7f76-453a-919d-413861904646",
                "userName": "bjensen@example.com",
                "name": {
                    "formatted": "Ms. Barbara J Jensen, III",
                    "familyName": "Jensen",
                    "givenName": "Barbara"
                },
                "displayName": "Babs Jensen",
                "active": true,
                "emails": [
                    {"value": "bjensen@example.com", "type": "work", "primary": true},
                    {"value": "babs@jensen.org", "type": "home"}
                ],
                "phoneNumbers": [
                    {"value": "555-555-5555", "type": "work"}
                ]
            }),
        }
    }

    /// Set or overwrite a top-level attribute.
    pub fn with_attribute(mut self, name: &str, value: Value) -> Self {
        self.data[name] = value;
        self
    }

    /// Drop a top-level attribute.
    pub fn without_attribute(mut self, name: &str) -> Self {
        if let Some(map) = self.data.as_object_mut() {
            map.remove(name);
        }
        self
    }

    /// Attach the enterprise extension container and declare its URN.
    pub fn with_enterprise_extension(mut self, container: Value) -> Self {
        self.data["schemas"] = json!([USER_URN, ENTERPRISE_URN]);
        self.data[ENTERPRISE_URN] = container;
        self
    }

    pub fn build(self) -> Value {
        self.data
    }

    pub fn build_resource(self) -> Resource {
        Resource::from_json("User", self.data).expect("builder produced a malformed user")
    }
}

/// Builder for Group resources.
#[derive(Debug, Clone)]
pub struct GroupBuilder {
    data: Value,
}

impl GroupBuilder {
    /// Minimal valid Group: schemas, id, displayName.
    pub fn new() -> Self {
        Self {
            data: json!({
                "schemas": [GROUP_URN],
                "id": "e9e30dba-f08f-4109-8486-d5c6a331660a",
                "displayName": "Tour Guides"
            }),
        }
    }

    /// Two members in the style of the RFC 7643 Section 8.4 example.
    pub fn new_with_members() -> Self {
        Self::new().with_members(json!([
            {
                "value": "2819c223-7f76-453a-919d-413861904646",
                "type": "User",
                "display": "Babs Jensen"
            },
            {
                "value": "902c246b-6245-4190-8e05-00816be7344a",
                "type": "User",
                "display": "Mandy Pepperidge"
            }
        ]))
    }

    pub fn with_members(mut self, members: Value) -> Self {
        self.data["members"] = members;
        self
    }

    /// Set or overwrite a top-level attribute.
    pub fn with_attribute(mut self, name: &str, value: Value) -> Self {
        self.data[name] = value;
        self
    }

    pub fn build(self) -> Value {
        self.data
    }

    pub fn build_resource(self) -> Resource {
        Resource::from_json("Group", self.data).expect("builder produced a malformed group")
    }
}
