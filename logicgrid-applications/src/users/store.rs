//! Database-backed user storage

use super::types::{NewUser, UserRecord, UserSummary};
use crate::auth::LockoutState;
use crate::{ApplicationError, ApplicationResult};
use chrono::Utc;
use sqlx::error::ErrorKind;
use sqlx::SqlitePool;
use tracing::{debug, error, info};

const USER_COLUMNS: &str = "id, email, password_hash, is_admin, is_approved, failed_attempts, \
     lockout_until, ai_usage_count, created_at";

/// User store over the `users` table
#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> ApplicationResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a user and return its id
    ///
    /// A second row for an existing email is reported as
    /// [`ApplicationError::DuplicateEmail`].
    pub async fn insert(&self, user: &NewUser) -> ApplicationResult<i64> {
        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, is_admin, is_approved, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.is_approved)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error().map(|db| db.kind()) {
            Some(ErrorKind::UniqueViolation) => ApplicationError::DuplicateEmail,
            _ => {
                error!("Failed to insert user: {}", e);
                ApplicationError::Database(e)
            }
        })?;

        let id = result.last_insert_rowid();
        info!(
            user_id = id,
            is_admin = user.is_admin,
            is_approved = user.is_approved,
            "User created"
        );
        Ok(id)
    }

    pub async fn find_by_email(&self, email: &str) -> ApplicationResult<Option<UserRecord>> {
        let query = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserRecord>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> ApplicationResult<Option<UserRecord>> {
        let query = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// All users, ordered by email ignoring case
    pub async fn list(&self) -> ApplicationResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, email, is_admin, is_approved FROM users ORDER BY email COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Persist the lockout counter and expiry
    pub async fn record_lockout(&self, id: i64, state: &LockoutState) -> ApplicationResult<()> {
        sqlx::query("UPDATE users SET failed_attempts = ?, lockout_until = ? WHERE id = ?")
            .bind(state.failed_attempts)
            .bind(state.lockout_until)
            .bind(id)
            .execute(&self.pool)
            .await?;
        debug!(
            user_id = id,
            failed_attempts = state.failed_attempts,
            "Lockout state updated"
        );
        Ok(())
    }

    /// Replace the password hash, optionally clearing any lockout
    pub async fn set_password(
        &self,
        id: i64,
        password_hash: &str,
        clear_lockout: bool,
    ) -> ApplicationResult<u64> {
        let query = if clear_lockout {
            "UPDATE users SET password_hash = ?, failed_attempts = 0, lockout_until = NULL WHERE id = ?"
        } else {
            "UPDATE users SET password_hash = ? WHERE id = ?"
        };

        let result = sqlx::query(query)
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_admin(&self, id: i64, is_admin: bool) -> ApplicationResult<u64> {
        let result = sqlx::query("UPDATE users SET is_admin = ? WHERE id = ?")
            .bind(is_admin)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_approved(&self, id: i64, is_approved: bool) -> ApplicationResult<u64> {
        let result = sqlx::query("UPDATE users SET is_approved = ? WHERE id = ?")
            .bind(is_approved)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete a user; their sessions go with them
    ///
    /// A user that still owns protocols cannot be deleted and is reported as
    /// [`ApplicationError::Conflict`].
    pub async fn delete(&self, id: i64) -> ApplicationResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e.as_database_error().map(|db| db.kind()) {
                Some(ErrorKind::ForeignKeyViolation) => ApplicationError::Conflict {
                    message: "cannot delete user with existing data".to_string(),
                },
                _ => {
                    error!("Failed to delete user {}: {}", id, e);
                    ApplicationError::Database(e)
                }
            })?;
        Ok(result.rows_affected())
    }

    pub async fn set_usage_count(&self, id: i64, count: i64) -> ApplicationResult<()> {
        sqlx::query("UPDATE users SET ai_usage_count = ? WHERE id = ?")
            .bind(count)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
