//! bcrypt password hashing, run on the blocking thread pool.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::AuthError;

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

const ABSENT_USER_PASSWORD: &str = "folio-absent-user";

fn hashing_error(err: bcrypt::BcryptError) -> AuthError {
    match err {
        bcrypt::BcryptError::Truncation(..) => AuthError::PasswordTooLong {
            max: MAX_PASSWORD_BYTES,
        },
        other => AuthError::Hashing(other.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    absent_hash: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            absent_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Hash `password`; input bcrypt would truncate is refused.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::non_truncating_hash(password, cost))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(hashing_error)
    }

    /// Check `password` against a stored hash. A malformed hash is an error, a
    /// mismatch is `Ok(false)`.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::non_truncating_verify(password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(hashing_error)
    }

    /// Spend the same bcrypt work as [`verify`](Self::verify) when there is no
    /// stored hash to check against, so unknown usernames answer as slowly as
    /// known ones.
    pub async fn verify_absent(&self, password: &str) -> Result<(), AuthError> {
        let hash = self
            .absent_hash
            .get_or_try_init(|| self.hash(ABSENT_USER_PASSWORD))
            .await?;
        self.verify(password, hash).await?;
        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[tokio::test]
    async fn hash_is_salted_and_verifiable() {
        let first = hasher().hash("hunter2").await.unwrap();
        let second = hasher().hash("hunter2").await.unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$2"));
        assert!(hasher().verify("hunter2", &first).await.unwrap());
        assert!(!hasher().verify("hunter3", &first).await.unwrap());
    }

    #[tokio::test]
    async fn over_long_password_is_refused_not_truncated() {
        let long = "p".repeat(100);

        let err = hasher().hash(&long).await.unwrap_err();
        assert!(matches!(err, AuthError::PasswordTooLong { max: 72 }));

        let stored = hasher().hash(&"p".repeat(60)).await.unwrap();
        assert!(matches!(
            hasher().verify(&long, &stored).await,
            Err(AuthError::PasswordTooLong { .. })
        ));
    }

    #[tokio::test]
    async fn absent_user_check_reuses_one_hash() {
        let hasher = hasher();

        hasher.verify_absent("whatever").await.unwrap();
        let first = hasher.absent_hash.get().cloned().unwrap();
        hasher.verify_absent("something-else").await.unwrap();

        assert_eq!(hasher.absent_hash.get(), Some(&first));
    }

    #[tokio::test]
    async fn invalid_cost_is_an_error() {
        let err = PasswordHasher::new(99).hash("hunter2").await.unwrap_err();
        assert!(matches!(err, AuthError::Hashing(_)));
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(hasher().verify("hunter2", "plaintext").await.is_err());
    }
}
