//! Payload shapes real identity providers emit.
//!
//! Okta and Azure AD both deviate from the RFC 7644 letter in documented,
//! stable ways. The engine folds these shapes into the canonical form
//! instead of rejecting them, because rejecting them breaks every tenant
//! behind those providers.

use super::{device, envelope, patch_device, patch_user};
use crate::common::builders::UserBuilder;
use serde_json::json;

/// Okta sends a bare object (or scalar) where the schema declares a
/// multi-valued attribute.
#[test]
fn test_single_value_folded_into_collection() {
    let user = UserBuilder::new().build_resource();
    let patched = patch_user(
        user,
        envelope(json!([{
            "op": "add",
            "path": "emails",
            "value": {"value": "babs@example.com", "type": "work"}
        }])),
    )
    .unwrap();
    assert!(patched.get_attribute("emails").unwrap().is_array());

    let resource = device(json!({}));
    let patched = patch_device(
        resource,
        envelope(json!([{"op": "add", "path": "tags", "value": "vip"}])),
    )
    .unwrap();
    assert_eq!(patched.get_attribute("tags"), Some(&json!(["vip"])));
}

/// Azure AD capitalizes operation verbs.
#[test]
fn test_capitalized_op_verbs_accepted() {
    let user = UserBuilder::new_full().build_resource();
    let patched = patch_user(
        user,
        envelope(json!([
            {"op": "Replace", "path": "displayName", "value": "Barbara"},
            {"op": "Add", "path": "nickName", "value": "Babs"},
            {"op": "REMOVE", "path": "phoneNumbers"}
        ])),
    )
    .unwrap();
    assert_eq!(patched.get_attribute("displayName"), Some(&json!("Barbara")));
    assert_eq!(patched.get_attribute("nickName"), Some(&json!("Babs")));
    assert_eq!(patched.get_attribute("phoneNumbers"), None);
}

/// Azure AD sends booleans as strings, in assorted casings.
#[test]
fn test_string_booleans_folded() {
    for literal in ["true", "True", "TRUE"] {
        let user = UserBuilder::new_full().build_resource();
        let patched = patch_user(
            user,
            envelope(json!([{"op": "replace", "path": "active", "value": literal}])),
        )
        .unwrap();
        assert_eq!(patched.get_attribute("active"), Some(&json!(true)));
    }

    let user = UserBuilder::new_full().build_resource();
    let patched = patch_user(
        user,
        envelope(json!([{"op": "replace", "path": "active", "value": "False"}])),
    )
    .unwrap();
    assert_eq!(patched.get_attribute("active"), Some(&json!(false)));
}

/// Stringified integers are parsed, including surrounding whitespace.
#[test]
fn test_string_integers_folded() {
    let resource = device(json!({}));
    let patched = patch_device(
        resource,
        envelope(json!([{"op": "add", "path": "memoryGb", "value": " 16 "}])),
    )
    .unwrap();
    assert_eq!(patched.get_attribute("memoryGb"), Some(&json!(16)));
}

/// Azure AD pads complex values with explicit nulls for absent fields.
#[test]
fn test_null_sub_values_skipped() {
    let user = UserBuilder::new().build_resource();
    let patched = patch_user(
        user,
        envelope(json!([{
            "op": "add",
            "path": "name",
            "value": {"givenName": "Barbara", "middleName": null}
        }])),
    )
    .unwrap();
    assert_eq!(
        patched.get_attribute("name"),
        Some(&json!({"givenName": "Barbara"}))
    );
}

/// Azure AD spells no-path values with dotted keys instead of nesting.
#[test]
fn test_dotted_keys_in_pathless_values() {
    let user = UserBuilder::new().build_resource();
    let patched = patch_user(
        user,
        envelope(json!([{
            "op": "add",
            "value": {
                "name.givenName": "Barbara",
                "name.familyName": "Jensen",
                "displayName": "Babs"
            }
        }])),
    )
    .unwrap();
    assert_eq!(
        patched.get_attribute("name"),
        Some(&json!({"givenName": "Barbara", "familyName": "Jensen"}))
    );
    assert_eq!(patched.get_attribute("displayName"), Some(&json!("Babs")));
}

/// Null attribute values in a no-path operation mean "leave it alone".
#[test]
fn test_null_values_skipped_in_pathless_operations() {
    let user = UserBuilder::new_full().build_resource();
    let patched = patch_user(
        user,
        envelope(json!([{
            "op": "replace",
            "value": {"displayName": null, "nickName": "Babs"}
        }])),
    )
    .unwrap();
    assert_eq!(patched.get_attribute("displayName"), Some(&json!("Babs Jensen")));
    assert_eq!(patched.get_attribute("nickName"), Some(&json!("Babs")));
}

/// Filters survive gratuitous whitespace.
#[test]
fn test_whitespace_tolerant_filters() {
    let user = UserBuilder::new_full().build_resource();
    let patched = patch_user(
        user,
        envelope(json!([{
            "op": "remove",
            "path": "emails[  type  eq   \"home\"  ]"
        }])),
    )
    .unwrap();
    assert_eq!(
        patched.get_attribute("emails").unwrap().as_array().unwrap().len(),
        1
    );
}

/// The PatchOp message URN is matched case-insensitively.
#[test]
fn test_envelope_urn_case_insensitive() {
    let user = UserBuilder::new().build_resource();
    let patched = patch_user(
        user,
        json!({
            "schemas": ["URN:IETF:PARAMS:SCIM:API:MESSAGES:2.0:PATCHOP"],
            "Operations": [{"op": "add", "path": "nickName", "value": "Babs"}]
        }),
    )
    .unwrap();
    assert_eq!(patched.get_attribute("nickName"), Some(&json!("Babs")));
}

/// Filter string literals match case-insensitively unless the compared
/// sub-attribute is declared caseExact.
#[test]
fn test_filter_literal_case_folding() {
    let user = UserBuilder::new()
        .with_attribute("emails", json!([{"value": "a@example.com", "type": "WORK"}]))
        .build_resource();
    let patched = patch_user(
        user,
        envelope(json!([{
            "op": "replace",
            "path": "emails[type eq \"work\"].display",
            "value": "matched"
        }])),
    )
    .unwrap();
    assert_eq!(
        patched.to_json().pointer("/emails/0/display"),
        Some(&json!("matched"))
    );
}
