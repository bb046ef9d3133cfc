//! Password verification.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordVerifier};

/// Prefixes of the bcrypt modular crypt format.
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    #[error("argon2 error: {0}")]
    Argon2(String),
    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("stored hash is not a supported PHC or bcrypt string")]
    UnknownFormat,
}

type Result<T> = std::result::Result<T, CryptoError>;

/// Outcome of a password comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Match,
    Mismatch,
}

/// Password manager.
///
/// Only verifies: accounts are provisioned elsewhere. Stored hashes carry
/// their own algorithm, salt and cost, so Argon2 PHC strings and bcrypt
/// hashes written by older provisioning tools are both accepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct PasswordManager;

impl PasswordManager {
    /// Create a new [`PasswordManager`].
    pub fn new() -> Self {
        Self
    }

    /// Verify password against a stored hash.
    ///
    /// Returns an error only when the stored hash cannot be understood.
    pub fn verify_password(
        &self,
        password: impl AsRef<[u8]>,
        stored: &str,
    ) -> Result<Verification> {
        if BCRYPT_PREFIXES.iter().any(|prefix| stored.starts_with(prefix)) {
            return match bcrypt::verify(password, stored)? {
                true => Ok(Verification::Match),
                false => Ok(Verification::Mismatch),
            };
        }

        let parsed =
            PasswordHash::new(stored).map_err(|_| CryptoError::UnknownFormat)?;

        match Argon2::default().verify_password(password.as_ref(), &parsed) {
            Ok(()) => Ok(Verification::Match),
            Err(argon2::password_hash::Error::Password) => {
                Ok(Verification::Mismatch)
            },
            Err(err) => Err(CryptoError::Argon2(err.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString};
    use argon2::{Algorithm, Params, Version};
    use rand::rngs::OsRng;

    /// Hash with cheap Argon2id parameters so fixtures do not spend seconds
    /// hashing.
    pub(crate) fn hash_argon2(password: &str) -> String {
        hash_with(password, Params::new(1024, 1, 1, Some(32)).unwrap())
    }

    fn hash_with(password: &str, params: Params) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_argon2() {
        let pwd = PasswordManager::new();
        let hash = hash_argon2("P$soW%920$n&");

        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(
            pwd.verify_password("P$soW%920$n&", &hash).unwrap(),
            Verification::Match
        );
        assert_eq!(
            pwd.verify_password("P$soW%920$n", &hash).unwrap(),
            Verification::Mismatch
        );
    }

    #[test]
    fn test_embedded_params() {
        let pwd = PasswordManager::new();
        let cheap = hash_argon2("secret");
        let other = hash_with("secret", Params::new(2048, 2, 2, Some(64)).unwrap());

        assert!(other.contains("m=2048,t=2,p=2"));
        for hash in [cheap, other] {
            assert_eq!(
                pwd.verify_password("secret", &hash).unwrap(),
                Verification::Match
            );
            assert_eq!(
                pwd.verify_password("Secret", &hash).unwrap(),
                Verification::Mismatch
            );
        }
    }

    #[test]
    fn test_argon2i_hash() {
        let pwd = PasswordManager::new();
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::new(
            Algorithm::Argon2i,
            Version::V0x13,
            Params::new(1024, 1, 1, None).unwrap(),
        )
        .hash_password(b"secret", &salt)
        .unwrap()
        .to_string();

        assert!(hash.starts_with("$argon2i$"));
        assert_eq!(
            pwd.verify_password("secret", &hash).unwrap(),
            Verification::Match
        );
    }

    #[test]
    fn test_bcrypt() {
        let pwd = PasswordManager::new();
        let hash = bcrypt::hash("senha-do-medico", 4).unwrap();

        assert_eq!(
            pwd.verify_password("senha-do-medico", &hash).unwrap(),
            Verification::Match
        );
        assert_eq!(
            pwd.verify_password("senha-do-paciente", &hash).unwrap(),
            Verification::Mismatch
        );
    }

    #[test]
    fn test_unknown_format() {
        let pwd = PasswordManager::new();

        assert!(pwd.verify_password("secret", "secret").is_err());
        assert!(pwd.verify_password("secret", "").is_err());
    }
}
