//! Tiered request guards: authenticated, approved, admin

use crate::session::SessionManager;
use crate::users::{UserRecord, UserStore};
use crate::{ApplicationError, ApplicationResult};
use tracing::warn;

/// Composable authorization guards over sessions and user flags
///
/// Each tier implies the previous one. The only side effect is in
/// [`require_approved`](Self::require_approved), which destroys the session
/// of an unapproved user.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    sessions: SessionManager,
    users: UserStore,
}

impl AuthorizationGate {
    pub fn new(sessions: SessionManager, users: UserStore) -> Self {
        Self { sessions, users }
    }

    /// Resolve the session token to its user
    pub async fn require_authenticated(&self, token: Option<&str>) -> ApplicationResult<UserRecord> {
        let token = token.ok_or(ApplicationError::Unauthenticated)?;
        let user_id = self
            .sessions
            .resolve(token)
            .await?
            .ok_or(ApplicationError::Unauthenticated)?;

        self.users.find_by_id(user_id).await?.ok_or_else(|| {
            warn!(user_id, "Session refers to a missing user");
            ApplicationError::Unauthenticated
        })
    }

    /// Authenticated and approved; revokes the session otherwise
    pub async fn require_approved(&self, token: Option<&str>) -> ApplicationResult<UserRecord> {
        let user = self.require_authenticated(token).await?;

        if !user.is_approved {
            if let Some(token) = token {
                self.sessions.revoke(token).await?;
            }
            warn!(user_id = user.id, "Unapproved user rejected, session revoked");
            return Err(ApplicationError::PendingApproval);
        }

        Ok(user)
    }

    /// Approved and an administrator
    pub async fn require_admin(&self, token: Option<&str>) -> ApplicationResult<UserRecord> {
        let user = self.require_approved(token).await?;

        if !user.is_admin {
            warn!(user_id = user.id, "Non-admin rejected from admin operation");
            return Err(ApplicationError::forbidden("forbidden"));
        }

        Ok(user)
    }
}
