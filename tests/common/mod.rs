//! Shared utilities for the integration suite.

pub mod builders;

pub use builders::{ENTERPRISE_URN, GROUP_URN, GroupBuilder, USER_URN, UserBuilder};

/// Assert a patch outcome failed with the expected SCIM discriminator.
///
/// Works on any `Result<_, ScimError>`; checks the 400 status and the
/// `scimType` field of the would-be error body.
macro_rules! assert_scim_failure {
    ($result:expr, $scim_type:expr) => {
        match &$result {
            Err(err) => {
                assert_eq!(err.status, 400, "unexpected status in {err:?}");
                assert_eq!(
                    err.scim_type,
                    Some($scim_type),
                    "unexpected scimType in {err:?}"
                );
            }
            Ok(_) => panic!("expected a {:?} failure, but the patch succeeded", $scim_type),
        }
    };
}

/// Assert an error's detail text mentions a substring.
macro_rules! assert_detail_contains {
    ($result:expr, $substring:expr) => {
        match &$result {
            Err(err) => {
                let detail = err.detail.as_deref().unwrap_or_default();
                assert!(
                    detail.contains($substring),
                    "detail '{detail}' does not mention '{}'",
                    $substring
                );
            }
            Ok(_) => panic!("expected a failure mentioning '{}'", $substring),
        }
    };
}
