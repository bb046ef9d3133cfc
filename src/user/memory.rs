//! In-memory credential store used by tests.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::user::{Account, CredentialStore, StoreError};

#[derive(Clone, Debug)]
struct Row {
    email: String,
    account: Account,
}

/// [`CredentialStore`] keeping accounts in a map.
///
/// Email comparison is exact, mirroring PostgreSQL default collation.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    rows: RwLock<HashMap<i32, Row>>,
    unavailable: AtomicBool,
    lookups: AtomicUsize,
}

impl MemoryCredentialStore {
    /// Add an account.
    pub fn with_account(
        self,
        id: i32,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Self {
        if let Ok(mut rows) = self.rows.write() {
            rows.insert(
                id,
                Row {
                    email: email.to_owned(),
                    account: Account {
                        id,
                        name: name.to_owned(),
                        password_hash: password_hash.to_owned(),
                        role: role.to_owned(),
                    },
                },
            );
        }
        self
    }

    /// Make every following call fail like a lost connection.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of lookups performed so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "connection reset by peer (os error 104)".into(),
            ));
        }
        Ok(())
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".into())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Account>, StoreError> {
        self.check()?;
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;

        Ok(rows
            .values()
            .find(|row| row.email == email)
            .map(|row| row.account.clone()))
    }

    async fn find_role(
        &self,
        user_id: i32,
    ) -> Result<Option<String>, StoreError> {
        self.check()?;
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;

        Ok(rows.get(&user_id).map(|row| row.account.role.clone()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}
