//! One-way password hashing using Argon2id
//!
//! Digests are PHC strings, so the algorithm version and work factor travel
//! with each hash and verification keeps working after the costs change.

use crate::{ApplicationError, ApplicationResult};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use logicgrid_core::{run_blocking, HashingConfig};
use rand::rngs::OsRng;

/// Salted, adaptive password hasher
#[derive(Debug, Clone)]
pub struct CredentialStore {
    params: Params,
}

impl CredentialStore {
    /// Build a store with the given work factor
    pub fn new(config: HashingConfig) -> ApplicationResult<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| ApplicationError::Hashing {
            message: format!("invalid hashing parameters: {}", e),
        })?;

        Ok(Self { params })
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> ApplicationResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.hasher()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApplicationError::Hashing {
                message: e.to_string(),
            })
    }

    /// Check a plaintext password against a stored digest
    ///
    /// An empty or malformed digest (federation-only accounts) never matches.
    pub fn verify(digest: &str, plaintext: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// [`hash`](Self::hash) on the blocking pool
    pub async fn hash_async(&self, plaintext: String) -> ApplicationResult<String> {
        let store = self.clone();
        run_blocking("hash_password", move || store.hash(&plaintext)).await?
    }

    /// [`verify`](Self::verify) on the blocking pool
    pub async fn verify_async(&self, digest: String, plaintext: String) -> ApplicationResult<bool> {
        Ok(run_blocking("verify_password", move || Self::verify(&digest, &plaintext)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new(HashingConfig::fast()).unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let store = store();
        let digest = store.hash("Abcdef1!").unwrap();

        assert!(digest.starts_with("$argon2id$v=19$"));
        assert!(!digest.contains("Abcdef1!"));
        assert!(CredentialStore::verify(&digest, "Abcdef1!"));
        assert!(!CredentialStore::verify(&digest, "Abcdef1?"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let store = store();
        let first = store.hash("Abcdef1!").unwrap();
        let second = store.hash("Abcdef1!").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_digest_never_matches() {
        assert!(!CredentialStore::verify("", ""));
        assert!(!CredentialStore::verify("", "Abcdef1!"));
        assert!(!CredentialStore::verify("not-a-phc-string", "Abcdef1!"));
    }

    #[test]
    fn test_digest_records_work_factor() {
        let digest = store().hash("Abcdef1!").unwrap();
        assert!(digest.contains("m=64,t=1,p=1"));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let config = HashingConfig {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        };
        assert!(matches!(
            CredentialStore::new(config),
            Err(ApplicationError::Hashing { .. })
        ));
    }

    #[tokio::test]
    async fn test_async_variants_run_off_thread() {
        let store = store();
        let digest = store.hash_async("Abcdef1!".to_string()).await.unwrap();
        assert!(store
            .verify_async(digest.clone(), "Abcdef1!".to_string())
            .await
            .unwrap());
        assert!(!store
            .verify_async(digest, "wrong".to_string())
            .await
            .unwrap());
    }
}
