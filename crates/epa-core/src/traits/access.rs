//! Access control trait

use std::collections::HashSet;

/// Decides whether a credential may invoke an admin method
pub trait AccessController: Send + Sync {
    /// Whether `token` may call `method` in `context`
    fn allowed(&self, method: &str, context: &str, token: &str) -> bool;

    /// Whether the controller grants roles
    fn is_role_based(&self) -> bool;

    /// Roles granted to `token`, or `None` if the token is unknown
    fn roles(&self, token: &str) -> Option<HashSet<String>>;
}
