//! Failure classification into the RFC 7644 error body.
//!
//! Every rejected patch must map onto one deterministic `scimType`
//! discriminator with a 400 status. The table here pins the full
//! classification surface; the named tests cover the error body shape and
//! two malformed-payload shapes seen from live identity providers.

use super::{envelope, patch_group, patch_user, patch_user_strict};
use crate::common::builders::{GroupBuilder, UserBuilder};
use scim_patch::{ERROR_MESSAGE_URN, ScimError, ScimErrorType};
use serde_json::{Value, json};

struct ErrorCase {
    name: &'static str,
    operations: Value,
    expected: ScimErrorType,
    detail_contains: &'static str,
}

#[test]
fn test_error_classification_table() {
    let cases = vec![
        ErrorCase {
            name: "unknown_attribute",
            operations: json!([{"op": "add", "path": "bogusAttr", "value": "x"}]),
            expected: ScimErrorType::InvalidPath,
            detail_contains: "bogusAttr",
        },
        ErrorCase {
            name: "unknown_sub_attribute",
            operations: json!([{"op": "add", "path": "name.surname", "value": "x"}]),
            expected: ScimErrorType::InvalidPath,
            detail_contains: "surname",
        },
        ErrorCase {
            name: "unknown_schema_urn",
            operations: json!([{"op": "add", "path": "urn:example:unknown:attr", "value": "x"}]),
            expected: ScimErrorType::InvalidPath,
            detail_contains: "urn:example:unknown",
        },
        ErrorCase {
            name: "sub_path_on_scalar",
            operations: json!([{"op": "add", "path": "userName.first", "value": "x"}]),
            expected: ScimErrorType::InvalidPath,
            detail_contains: "userName",
        },
        ErrorCase {
            name: "filter_on_single_valued",
            operations: json!([{"op": "replace", "path": "userName[type eq \"work\"]", "value": "x"}]),
            expected: ScimErrorType::InvalidFilter,
            detail_contains: "does not support value filters",
        },
        ErrorCase {
            name: "unsupported_comparator",
            operations: json!([{"op": "remove", "path": "emails[type co \"w\"]"}]),
            expected: ScimErrorType::InvalidFilter,
            detail_contains: "'co'",
        },
        ErrorCase {
            name: "filter_missing_literal",
            operations: json!([{"op": "remove", "path": "emails[type eq]"}]),
            expected: ScimErrorType::InvalidFilter,
            detail_contains: "filter",
        },
        ErrorCase {
            name: "trailing_garbage_after_path",
            operations: json!([{"op": "remove", "path": "emails[type eq \"work\"] extra"}]),
            expected: ScimErrorType::InvalidSyntax,
            detail_contains: "position",
        },
        ErrorCase {
            name: "remove_without_path",
            operations: json!([{"op": "remove"}]),
            expected: ScimErrorType::NoTarget,
            detail_contains: "require a path",
        },
        ErrorCase {
            name: "replace_missing_target",
            operations: json!([{"op": "replace", "path": "nickName", "value": "Babs"}]),
            expected: ScimErrorType::NoTarget,
            detail_contains: "nickName",
        },
        ErrorCase {
            name: "readonly_attribute",
            operations: json!([{"op": "replace", "path": "id", "value": "new-id"}]),
            expected: ScimErrorType::Mutability,
            detail_contains: "read-only",
        },
        ErrorCase {
            name: "readonly_sub_attribute",
            operations: json!([{"op": "add", "path": "meta.created", "value": "2011-05-13T04:42:34Z"}]),
            expected: ScimErrorType::Mutability,
            detail_contains: "created",
        },
        ErrorCase {
            name: "boolean_type_mismatch",
            operations: json!([{"op": "replace", "path": "active", "value": "maybe"}]),
            expected: ScimErrorType::InvalidValue,
            detail_contains: "active",
        },
        ErrorCase {
            name: "canonical_value_violation",
            operations: json!([{"op": "replace", "path": "emails[type eq \"work\"].type", "value": "personal"}]),
            expected: ScimErrorType::InvalidValue,
            detail_contains: "personal",
        },
        ErrorCase {
            name: "malformed_reference_value",
            operations: json!([{"op": "add", "path": "profileUrl", "value": "\\bad\\path"}]),
            expected: ScimErrorType::InvalidSyntax,
            detail_contains: "profileUrl",
        },
        ErrorCase {
            name: "add_without_value",
            operations: json!([{"op": "add", "path": "displayName"}]),
            expected: ScimErrorType::InvalidValue,
            detail_contains: "require a value",
        },
        ErrorCase {
            name: "remove_with_value",
            operations: json!([{"op": "remove", "path": "displayName", "value": "x"}]),
            expected: ScimErrorType::InvalidValue,
            detail_contains: "must not carry a value",
        },
        ErrorCase {
            name: "array_for_single_valued",
            operations: json!([{"op": "replace", "path": "userName", "value": ["a", "b"]}]),
            expected: ScimErrorType::InvalidValue,
            detail_contains: "userName",
        },
    ];

    for case in cases {
        println!("running case: {}", case.name);
        let user = UserBuilder::new_full().build_resource();
        let result = patch_user(user, envelope(case.operations));
        match &result {
            Err(err) => {
                assert_eq!(err.status, 400, "case '{}': {err:?}", case.name);
                assert_eq!(
                    err.scim_type,
                    Some(case.expected),
                    "case '{}': {err:?}",
                    case.name
                );
                let detail = err.detail.as_deref().unwrap_or_default();
                assert!(
                    detail.contains(case.detail_contains),
                    "case '{}': detail '{detail}' does not mention '{}'",
                    case.name,
                    case.detail_contains
                );
            }
            Ok(_) => panic!("case '{}' unexpectedly succeeded", case.name),
        }
    }
}

#[test]
fn test_envelope_failures() {
    let user = UserBuilder::new().build_resource();
    let result = patch_user(
        user,
        json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:BulkRequest"],
            "Operations": [{"op": "add", "path": "nickName", "value": "Babs"}]
        }),
    );
    assert_scim_failure!(result, ScimErrorType::InvalidSyntax);

    let user = UserBuilder::new().build_resource();
    let result = patch_user(user, envelope(json!([])));
    assert_scim_failure!(result, ScimErrorType::InvalidValue);
    assert_detail_contains!(result, "at least one operation");
}

#[test]
fn test_unknown_op_verb_rejected_at_deserialization() {
    let body = envelope(json!([{"op": "merge", "path": "nickName", "value": "x"}]));
    let result = serde_json::from_value::<scim_patch::PatchRequest>(body);
    let message = result.unwrap_err().to_string();
    assert!(message.contains("merge"), "unhelpful message: {message}");
}

#[test]
fn test_strict_remove_reports_missing_targets() {
    let user = UserBuilder::new().build_resource();
    let result = patch_user_strict(
        user,
        envelope(json!([{"op": "remove", "path": "emails[type eq \"work\"]"}])),
    );
    assert_scim_failure!(result, ScimErrorType::NoTarget);
}

/// A member added with a backslash-ridden `$ref` must come back as
/// invalidSyntax naming the element sub-attribute, so operators can see
/// which identity provider field to fix.
#[test]
fn test_malformed_member_ref_details_the_sub_attribute() {
    let group = GroupBuilder::new().build_resource();
    let result = patch_group(
        group,
        envelope(json!([{
            "op": "add",
            "path": "members",
            "value": {"value": "2819c223", "$ref": "\\badthing"}
        }])),
    );
    assert_scim_failure!(result, ScimErrorType::InvalidSyntax);
    assert_detail_contains!(result, "member.$ref");
    assert_detail_contains!(result, "\\badthing");
}

/// A resource whose `schemas` is JSON null survives the operations and is
/// caught by the final whole-resource pass as invalidValue.
#[test]
fn test_null_schemas_caught_by_final_validation() {
    let user = UserBuilder::new()
        .with_attribute("schemas", json!(null))
        .build_resource();
    let result = patch_user(
        user,
        envelope(json!([{"op": "add", "path": "nickName", "value": "Babs"}])),
    );
    match result {
        Err(err) => {
            assert_eq!(err.status, 400);
            assert_eq!(err.scim_type, Some(ScimErrorType::InvalidValue));
            assert_eq!(err.schemas, vec![ERROR_MESSAGE_URN.to_string()]);
        }
        Ok(_) => panic!("null schemas slipped through final validation"),
    }
}

/// The wire form of the error body: status is a JSON string per RFC 7644
/// and the scimType discriminator is camelCase.
#[test]
fn test_error_body_wire_shape() {
    let user = UserBuilder::new().build_resource();
    let err = patch_user(
        user,
        envelope(json!([{"op": "remove"}])),
    )
    .unwrap_err();

    let body = serde_json::to_value(&err).unwrap();
    assert_eq!(body["schemas"], json!([ERROR_MESSAGE_URN]));
    assert_eq!(body["status"], json!("400"));
    assert_eq!(body["scimType"], json!("noTarget"));
    assert!(body["detail"].as_str().unwrap().contains("path"));

    let round_tripped: ScimError = serde_json::from_value(body).unwrap();
    assert_eq!(round_tripped.status, 400);
    assert_eq!(round_tripped.scim_type, Some(ScimErrorType::NoTarget));
}
