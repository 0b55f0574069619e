//! Static pre-shared token access control
//!
//! Admin requests present a token that must match the one configured for
//! the daemon. A matching token is allowed every method in every context
//! and carries no roles.
//!
//! # Security Model
//!
//! - Tokens are compared in constant time
//! - Generated tokens are 32 random bytes, hex-encoded (64 chars)
//! - An empty configured token never matches

use std::collections::HashSet;

use crate::traits::AccessController;

/// Length of a generated token in bytes (before hex encoding)
const TOKEN_BYTES: usize = 32;

/// Access controller backed by a single configured token
#[derive(Clone)]
pub struct StaticTokenAccessController {
    token: String,
}

impl StaticTokenAccessController {
    /// Create a controller accepting `token`
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn is_configured_token(&self, token: &str) -> bool {
        !self.token.is_empty() && validate_token(token, &self.token)
    }
}

impl std::fmt::Debug for StaticTokenAccessController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenAccessController")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AccessController for StaticTokenAccessController {
    fn allowed(&self, method: &str, context: &str, token: &str) -> bool {
        let allowed = self.is_configured_token(token);
        if !allowed {
            tracing::debug!(method, context, "Rejected admin request with unknown token");
        }
        allowed
    }

    fn is_role_based(&self) -> bool {
        false
    }

    fn roles(&self, token: &str) -> Option<HashSet<String>> {
        self.is_configured_token(token).then(HashSet::new)
    }
}

/// Generate a new random token
///
/// Returns a 64-character hex string (32 random bytes)
pub fn generate_token() -> String {
    use rand::Rng;
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Compare a presented token with the expected one in constant time
pub fn validate_token(provided: &str, expected: &str) -> bool {
    if provided.len() != expected.len() {
        return false;
    }

    let mut result = 0u8;
    for (a, b) in provided.bytes().zip(expected.bytes()) {
        result |= a ^ b;
    }
    result == 0
}
