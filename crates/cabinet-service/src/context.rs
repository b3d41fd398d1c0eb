//! Request context carrying the authenticated user.

use uuid::Uuid;

/// Context for the current authenticated request.
///
/// Built by the HTTP layer after token resolution and passed into service
/// methods so that every operation knows who is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
