//! Handle database requests.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::user::Account;

/// Error raised while reaching the credential store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to stored accounts.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the account whose email is exactly `email`.
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Find the role label of an account.
    async fn find_role(&self, user_id: i32)
    -> Result<Option<String>, StoreError>;

    /// Check the store answers.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// [`CredentialStore`] backed by the `usuario` relation.
#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"SELECT id, nome AS name, senha AS password_hash, tipo AS role
                FROM usuario WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_role(
        &self,
        user_id: i32,
    ) -> Result<Option<String>, StoreError> {
        let role = sqlx::query_scalar::<_, String>(
            r#"SELECT tipo FROM usuario WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
