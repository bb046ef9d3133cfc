//! Authenticator and role resolver over a credential store.

use std::sync::Arc;

use validator::Validate;

use crate::crypto::{PasswordManager, Verification};
use crate::error::{Result, ServerError};
use crate::role::Role;
use crate::user::{ANONYMOUS, CredentialStore, Credentials, Identity};

/// User manager.
///
/// Holds no per-request state: every call performs at most one store round
/// trip, so a single instance is shared by all requests.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn CredentialStore>,
    pwd: Arc<PasswordManager>,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(store: Arc<dyn CredentialStore>, pwd: Arc<PasswordManager>) -> Self {
        Self { store, pwd }
    }

    /// Check the underlying store answers.
    pub async fn ping(&self) -> Result<()> {
        Ok(self.store.ping().await?)
    }

    /// Authenticate an account with its email and password.
    ///
    /// Unknown email and wrong password fail with the same
    /// [`ServerError::InvalidCredentials`] so callers cannot tell which
    /// accounts exist.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Identity> {
        if let Err(err) = credentials.validate() {
            record_attempt("invalid_argument");
            return Err(err.into());
        }

        let account = match self.store.find_by_email(&credentials.email).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                record_attempt("invalid_credentials");
                return Err(ServerError::InvalidCredentials);
            },
            Err(err) => {
                record_attempt("internal");
                return Err(err.into());
            },
        };

        // Hashing is deliberately slow: keep it off the async workers.
        let pwd = Arc::clone(&self.pwd);
        let password = credentials.password.clone();
        let hash = account.password_hash.clone();
        let verification = tokio::task::spawn_blocking(move || {
            pwd.verify_password(password, &hash)
        })
        .await
        .map_err(|err| {
            record_attempt("internal");
            ServerError::internal("password verification task failed", err)
        })?;

        match verification {
            Ok(Verification::Match) => {
                record_attempt("success");
                tracing::debug!(user_id = account.id, "user authenticated");
                Ok(Identity::from(account))
            },
            Ok(Verification::Mismatch) => {
                record_attempt("invalid_credentials");
                Err(ServerError::InvalidCredentials)
            },
            Err(err) => {
                tracing::warn!(
                    user_id = account.id,
                    error = %err,
                    "stored password hash cannot be verified"
                );
                record_attempt("invalid_credentials");
                Err(ServerError::InvalidCredentials)
            },
        }
    }

    /// Resolve the role of the caller identified by `user_id`.
    pub async fn resolve_role(&self, user_id: i32) -> Result<Role> {
        if user_id == ANONYMOUS {
            record_resolution("anonymous");
            return Err(ServerError::LoginRequired);
        }

        match self.store.find_role(user_id).await {
            Ok(Some(label)) => {
                record_resolution("success");
                Ok(Role::from_label(&label))
            },
            Ok(None) => {
                record_resolution("invalid_token");
                Err(ServerError::InvalidToken)
            },
            Err(err) => {
                record_resolution("internal");
                Err(err.into())
            },
        }
    }
}

fn record_attempt(outcome: &'static str) {
    metrics::counter!("auth_attempts_total", "outcome" => outcome).increment(1);
}

fn record_resolution(outcome: &'static str) {
    metrics::counter!("role_resolutions_total", "outcome" => outcome).increment(1);
}
