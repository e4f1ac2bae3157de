use crate::{auth::AuthUser, error::ApiError, models::Role};

/// RoleAccess
///
/// A per-operation authorization guard: a static allow-list of roles checked
/// against the resolved identity before the handler body runs. Handlers call
/// `check` as their first statement, ahead of the rate limiter and any data
/// access.
pub struct RoleAccess {
    allowed: &'static [Role],
}

impl RoleAccess {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    /// Allow/deny decision for the given identity. Deny is a 403 with a
    /// fixed detail message; the caller's role is logged, never echoed back.
    pub fn check(&self, user: &AuthUser) -> Result<(), ApiError> {
        if self.allowed.contains(&user.role) {
            Ok(())
        } else {
            tracing::warn!(user_id = %user.id, role = %user.role, "operation forbidden");
            Err(ApiError::Forbidden("Operation forbidden".to_string()))
        }
    }
}

// Allow-lists for the contact operations. Reads, creates and updates are open
// to every role; removal is restricted to administrators.
pub const ALLOWED_READ: RoleAccess = RoleAccess::new(&[Role::Admin, Role::Moderator, Role::User]);
pub const ALLOWED_CREATE: RoleAccess = RoleAccess::new(&[Role::Admin, Role::Moderator, Role::User]);
pub const ALLOWED_UPDATE: RoleAccess = RoleAccess::new(&[Role::Admin, Role::Moderator, Role::User]);
pub const ALLOWED_REMOVE: RoleAccess = RoleAccess::new(&[Role::Admin]);
