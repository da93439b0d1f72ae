//! All-or-nothing behavior of multi-operation documents.
//!
//! Operations apply strictly in array order. The first failure wins, the
//! mutated working copy is discarded rather than returned, and a document
//! whose operations all succeed can still be rejected as a whole by the
//! final validation pass.

use super::{envelope, patch_user};
use crate::common::builders::UserBuilder;
use scim_patch::ScimErrorType;
use serde_json::json;

#[test]
fn test_first_failure_wins() {
    // Operation 2 fails on an unknown attribute; operation 3 would fail
    // differently (readOnly). The reported error must be operation 2's.
    let user = UserBuilder::new_full().build_resource();
    let result = patch_user(
        user,
        envelope(json!([
            {"op": "add", "path": "nickName", "value": "Babs"},
            {"op": "add", "path": "bogusAttr", "value": "x"},
            {"op": "replace", "path": "id", "value": "new-id"}
        ])),
    );
    assert_scim_failure!(result, ScimErrorType::InvalidPath);
    assert_detail_contains!(result, "bogusAttr");
}

#[test]
fn test_failure_returns_nothing_mutated() {
    let user = UserBuilder::new_full().build_resource();
    let snapshot = user.clone();

    let result = patch_user(
        user,
        envelope(json!([
            {"op": "replace", "path": "userName", "value": "changed@example.com"},
            {"op": "add", "path": "bogusAttr", "value": "x"}
        ])),
    );
    assert!(result.is_err());

    // The caller's own copy is the rollback: the engine consumed the moved
    // resource and dropped the half-mutated working copy with the error.
    assert_eq!(
        snapshot.get_attribute("userName"),
        Some(&json!("bjensen@example.com"))
    );

    // The same document without the poisoned operation goes through,
    // proving the failure blocked the whole document rather than one step.
    let patched = patch_user(
        snapshot,
        envelope(json!([
            {"op": "replace", "path": "userName", "value": "changed@example.com"}
        ])),
    )
    .unwrap();
    assert_eq!(
        patched.get_attribute("userName"),
        Some(&json!("changed@example.com"))
    );
}

#[test]
fn test_operations_apply_in_array_order() {
    let user = UserBuilder::new().build_resource();
    let patched = patch_user(
        user,
        envelope(json!([
            {"op": "add", "path": "nickName", "value": "first"},
            {"op": "replace", "path": "nickName", "value": "second"},
            {"op": "remove", "path": "nickName"},
            {"op": "add", "path": "nickName", "value": "final"}
        ])),
    )
    .unwrap();
    assert_eq!(patched.get_attribute("nickName"), Some(&json!("final")));

    // Reordered, the replace targets a value the remove already deleted.
    let user = UserBuilder::new().build_resource();
    let result = patch_user(
        user,
        envelope(json!([
            {"op": "add", "path": "nickName", "value": "first"},
            {"op": "remove", "path": "nickName"},
            {"op": "replace", "path": "nickName", "value": "second"}
        ])),
    );
    assert_scim_failure!(result, ScimErrorType::NoTarget);
}

#[test]
fn test_each_operation_sees_prior_mutations() {
    let user = UserBuilder::new().build_resource();
    let patched = patch_user(
        user,
        envelope(json!([
            {"op": "add", "path": "emails", "value": {"value": "a@example.com", "type": "work"}},
            {"op": "replace", "path": "emails[type eq \"work\"].display", "value": "Work inbox"}
        ])),
    )
    .unwrap();
    assert_eq!(
        patched.to_json().pointer("/emails/0/display"),
        Some(&json!("Work inbox"))
    );
}

#[test]
fn test_valid_operations_can_fail_the_document() {
    // Removing userName is a legal operation on its own; the resulting
    // resource is missing a required attribute and the final validation
    // pass rejects the whole document.
    let user = UserBuilder::new_full().build_resource();
    let result = patch_user(
        user,
        envelope(json!([
            {"op": "add", "path": "nickName", "value": "Babs"},
            {"op": "remove", "path": "userName"}
        ])),
    );
    assert_scim_failure!(result, ScimErrorType::InvalidValue);
    assert_detail_contains!(result, "userName");
}
