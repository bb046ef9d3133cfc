//! Clinic accounts: credential store, authentication and role resolution.

#[cfg(test)]
mod memory;
mod repository;
mod service;

#[cfg(test)]
pub use memory::*;
pub use repository::*;
pub use service::*;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::role::Role;

/// Caller identifier meaning "nobody logged in".
pub const ANONYMOUS: i32 = 0;

/// Account as read from the credential store.
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Account {
    pub id: i32,
    pub name: String,
    pub password_hash: String,
    /// Raw role label.
    pub role: String,
}

/// Login credentials.
///
/// Missing fields deserialize as empty strings so that they are reported as
/// validation errors rather than body parsing errors.
#[derive(Clone, Default, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Authenticated identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identifier the caller reuses to identify itself.
    pub token: i32,
    pub user_id: i32,
    pub name: String,
    pub role: Role,
}

impl From<Account> for Identity {
    fn from(account: Account) -> Self {
        Self {
            token: account.id,
            user_id: account.id,
            role: Role::from_label(&account.role),
            name: account.name,
        }
    }
}

/// Caller resolved from its identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: i32,
    pub role: Role,
}
