//! The acting panel session.

pub mod role;

use serde::{Deserialize, Serialize};

use explorer_core::error::AppError;

pub use role::UserRole;

/// Who is operating the explorer.
///
/// Authentication happens elsewhere; the explorer only needs the resolved
/// username (recorded on versions and events) and role (which gates every
/// change to the server's files).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Panel username.
    pub username: String,
    /// Role on the current server.
    pub role: UserRole,
}

impl SessionContext {
    /// Creates a new session context.
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Fails with an authorization error unless the session holds `role` or better.
    pub fn require(&self, role: UserRole, action: &str) -> Result<(), AppError> {
        if self.role.has_at_least(&role) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "{action} requires the {role} role (current: {})",
                self.role
            )))
        }
    }
}
