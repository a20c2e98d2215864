use subtle::ConstantTimeEq;

use crate::utils::{UtilError, gen_random_string};

/// Number of random bytes behind every OAuth2 `state` value.
pub(crate) const STATE_TOKEN_BYTES: usize = 16;

/// Issue a fresh opaque `state` value for the authorization request.
pub fn generate_state() -> Result<String, UtilError> {
    gen_random_string(STATE_TOKEN_BYTES)
}

/// Compare the `state` echoed back by the provider with the one bound to the browser.
pub(crate) fn state_matches(returned: &str, bound: &str) -> bool {
    !bound.is_empty() && returned.as_bytes().ct_eq(bound.as_bytes()).into()
}
