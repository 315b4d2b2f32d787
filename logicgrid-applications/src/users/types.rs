//! User record shapes

use crate::auth::LockoutState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Full user row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    /// Empty for accounts that only sign in through federation
    pub password_hash: String,
    pub is_admin: bool,
    pub is_approved: bool,
    pub failed_attempts: i64,
    pub lockout_until: Option<DateTime<Utc>>,
    pub ai_usage_count: i64,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn lockout_state(&self) -> LockoutState {
        LockoutState {
            failed_attempts: self.failed_attempts,
            lockout_until: self.lockout_until,
        }
    }

    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            email: self.email.clone(),
            created_at: self.created_at,
            is_admin: self.is_admin,
            is_approved: self.is_approved,
        }
    }
}

/// Profile returned to the signed-in user
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub is_admin: bool,
    pub is_approved: bool,
}

/// Row of the administrator's user listing
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
    pub is_approved: bool,
}

/// Values for a new user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_approved: bool,
}
