use async_trait::async_trait;
use folio_authz::UserDirectory;
use folio_db::DbPool;
use folio_http::{field_error, AppError};

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("user {0} already exists")]
    Duplicate(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<UserStoreError> for AppError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::Duplicate(username) => AppError::duplicate(
                vec![field_error("username", "already exists")],
                format!("user {} already exists", username),
            ),
            UserStoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

/// Registered users and their bcrypt hashes
#[derive(Clone)]
pub struct UserStore {
    pool: DbPool,
}

impl UserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, username: &str, password_hash: &str) -> Result<(), UserStoreError> {
        sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if folio_db::is_unique_violation(&e) {
                    UserStoreError::Duplicate(username.to_string())
                } else {
                    UserStoreError::Database(e)
                }
            })?;
        Ok(())
    }

    pub async fn password_hash(&self, username: &str) -> Result<Option<String>, UserStoreError> {
        let hash = sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hash)
    }

    pub async fn exists(&self, username: &str) -> Result<bool, UserStoreError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl UserDirectory for UserStore {
    async fn user_exists(&self, username: &str) -> anyhow::Result<bool> {
        Ok(self.exists(username).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::MIGRATION_001;

    async fn store() -> UserStore {
        let pool = folio_db::connect("sqlite::memory:", 1).await.unwrap();
        sqlx::raw_sql(MIGRATION_001).execute(&pool).await.unwrap();
        UserStore::new(pool)
    }

    #[tokio::test]
    async fn create_then_lookup() {
        let users = store().await;
        users.create("alice", "$2b$04$hash").await.unwrap();

        assert!(users.exists("alice").await.unwrap());
        assert!(!users.exists("bob").await.unwrap());
        assert_eq!(
            users.password_hash("alice").await.unwrap().as_deref(),
            Some("$2b$04$hash")
        );
        assert!(users.password_hash("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let users = store().await;
        users.create("alice", "first").await.unwrap();

        let err = users.create("alice", "second").await.unwrap_err();
        assert!(matches!(err, UserStoreError::Duplicate(ref name) if name == "alice"));
    }

    #[tokio::test]
    async fn serves_as_user_directory() {
        let users = store().await;
        users.create("carol", "hash").await.unwrap();

        let directory: &dyn UserDirectory = &users;
        assert!(directory.user_exists("carol").await.unwrap());
        assert!(!directory.user_exists("dave").await.unwrap());
    }
}
