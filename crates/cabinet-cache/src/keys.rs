//! Cache key builders.
//!
//! The login flow that writes credentials is external, so these keys
//! are a contract with it and must not change shape.

/// Key under which the user id for a session token is stored.
pub fn auth_token(token: &str) -> String {
    format!("auth_{token}")
}
