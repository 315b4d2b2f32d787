//! Session Manager - issue, resolve and revoke session tokens

use super::types::{token_prefix, SessionToken};
use crate::ApplicationResult;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, error, info};

/// Database-backed session manager
///
/// Holds no in-process state; every call is a single statement against the
/// `sessions` table.
#[derive(Debug, Clone)]
pub struct SessionManager {
    pool: SqlitePool,
}

impl SessionManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new session for `user_id` and return its token
    pub async fn issue(&self, user_id: i64) -> ApplicationResult<SessionToken> {
        let token = SessionToken::generate();

        sqlx::query("INSERT INTO sessions (id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(token.as_str())
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to create session for user {}: {}", user_id, e);
                e
            })?;

        info!(user_id, session = token.prefix(), "Session issued");
        Ok(token)
    }

    /// Owner of `token`, or `None` if the token is unknown
    pub async fn resolve(&self, token: &str) -> ApplicationResult<Option<i64>> {
        if token.is_empty() {
            return Ok(None);
        }

        let user_id: Option<i64> = sqlx::query_scalar("SELECT user_id FROM sessions WHERE id = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        debug!(
            session = token_prefix(token),
            resolved = user_id.is_some(),
            "Session lookup"
        );
        Ok(user_id)
    }

    /// Delete one session; revoking an unknown token is not an error
    pub async fn revoke(&self, token: &str) -> ApplicationResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!(session = token_prefix(token), "Session revoked");
        }
        Ok(())
    }

    /// Delete every session belonging to `user_id`
    pub async fn revoke_all(&self, user_id: i64) -> ApplicationResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!(
            user_id,
            revoked = result.rows_affected(),
            "All sessions revoked for user"
        );
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::memory_database;
    use crate::users::{NewUser, UserStore};

    async fn setup() -> (SessionManager, UserStore) {
        let database = memory_database().await;
        (
            SessionManager::new(database.pool().clone()),
            UserStore::new(database.pool().clone()),
        )
    }

    async fn user(users: &UserStore, email: &str) -> i64 {
        users
            .insert(&NewUser {
                email: email.to_string(),
                password_hash: String::new(),
                is_admin: false,
                is_approved: true,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_issued_session_resolves_to_owner() {
        let (sessions, users) = setup().await;
        let owner = user(&users, "a@example.com").await;

        let token = sessions.issue(owner).await.unwrap();
        assert_eq!(sessions.resolve(token.as_str()).await.unwrap(), Some(owner));
    }

    #[tokio::test]
    async fn test_unknown_and_empty_tokens_are_absent() {
        let (sessions, _) = setup().await;
        assert_eq!(sessions.resolve("").await.unwrap(), None);
        assert_eq!(sessions.resolve("no-such-token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (sessions, users) = setup().await;
        let owner = user(&users, "a@example.com").await;
        let token = sessions.issue(owner).await.unwrap();

        sessions.revoke(token.as_str()).await.unwrap();
        assert_eq!(sessions.resolve(token.as_str()).await.unwrap(), None);
        sessions.revoke(token.as_str()).await.unwrap();
    }

    #[tokio::test]
    async fn test_revoke_all_only_touches_one_user() {
        let (sessions, users) = setup().await;
        let alice = user(&users, "alice@example.com").await;
        let bob = user(&users, "bob@example.com").await;

        let first = sessions.issue(alice).await.unwrap();
        let second = sessions.issue(alice).await.unwrap();
        let other = sessions.issue(bob).await.unwrap();
        assert_ne!(first, second);

        assert_eq!(sessions.revoke_all(alice).await.unwrap(), 2);
        assert_eq!(sessions.resolve(first.as_str()).await.unwrap(), None);
        assert_eq!(sessions.resolve(second.as_str()).await.unwrap(), None);
        assert_eq!(sessions.resolve(other.as_str()).await.unwrap(), Some(bob));
    }

    #[tokio::test]
    async fn test_sessions_cascade_with_user() {
        let (sessions, users) = setup().await;
        let owner = user(&users, "a@example.com").await;
        let token = sessions.issue(owner).await.unwrap();

        assert_eq!(users.delete(owner).await.unwrap(), 1);
        assert_eq!(sessions.resolve(token.as_str()).await.unwrap(), None);
    }
}
