//! Account flows: signup, login, password changes and user administration
//!
//! These drive [`PasswordPolicy`], [`CredentialStore`] and [`LockoutGuard`]
//! directly and finish by issuing a session, so they sit in front of the
//! authorization gate rather than behind it.

use crate::auth::{CredentialStore, FailureOutcome, LockoutGuard, LockoutStatus, PasswordPolicy};
use crate::session::{SessionManager, SessionToken};
use crate::users::{NewUser, UserInfo, UserRecord, UserStore, UserSummary};
use crate::{ApplicationError, ApplicationResult};
use chrono::{DateTime, Utc};
use logicgrid_core::log_operation_start;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub new_password: String,
}

/// Body of every admin action that targets a single user
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TargetUserRequest {
    #[serde(default)]
    pub user_id: i64,
}

impl TargetUserRequest {
    fn target(&self) -> ApplicationResult<i64> {
        if self.user_id <= 0 {
            return Err(ApplicationError::validation("userId required"));
        }
        Ok(self.user_id)
    }
}

#[derive(Debug)]
pub struct SignupOutcome {
    pub user_id: i64,
    pub auto_login: bool,
    pub is_admin: bool,
    pub is_approved: bool,
    /// Present when the new account was signed in straight away
    pub session: Option<SessionToken>,
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub user_id: i64,
    pub session: SessionToken,
}

/// Password-based account service
#[derive(Debug, Clone)]
pub struct AccountService {
    users: UserStore,
    sessions: SessionManager,
    credentials: CredentialStore,
    auto_approve: bool,
}

impl AccountService {
    pub fn new(
        users: UserStore,
        sessions: SessionManager,
        credentials: CredentialStore,
        auto_approve: bool,
    ) -> Self {
        Self {
            users,
            sessions,
            credentials,
            auto_approve,
        }
    }

    /// Register a new account
    ///
    /// The first account ever created becomes an approved administrator.
    pub async fn signup(&self, request: SignupRequest) -> ApplicationResult<SignupOutcome> {
        log_operation_start!("signup");
        if request.email.is_empty() || request.password.is_empty() {
            return Err(ApplicationError::validation("email and password required"));
        }
        PasswordPolicy::validate(&request.password)?;

        let password_hash = self.credentials.hash_async(request.password).await?;

        let first_user = self.users.count().await? == 0;
        let is_admin = first_user;
        let is_approved = first_user || self.auto_approve;

        let user_id = self
            .users
            .insert(&NewUser {
                email: request.email,
                password_hash,
                is_admin,
                is_approved,
            })
            .await?;

        let session = if is_approved {
            Some(self.sessions.issue(user_id).await?)
        } else {
            None
        };

        if first_user {
            info!(user_id, "First account bootstrapped as administrator");
        }

        Ok(SignupOutcome {
            user_id,
            auto_login: session.is_some(),
            is_admin,
            is_approved,
            session,
        })
    }

    pub async fn login(&self, request: LoginRequest) -> ApplicationResult<LoginOutcome> {
        self.login_at(request, Utc::now()).await
    }

    /// Log in with an explicit clock, for lockout expiry
    pub async fn login_at(
        &self,
        request: LoginRequest,
        now: DateTime<Utc>,
    ) -> ApplicationResult<LoginOutcome> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(ApplicationError::InvalidCredentials)?;

        let state = user.lockout_state();
        if let LockoutStatus::Locked { until } = LockoutGuard::status(&state, now) {
            warn!(user_id = user.id, %until, "Login attempt on locked account");
            return Err(ApplicationError::AccountLocked);
        }

        let matched = self
            .credentials
            .verify_async(user.password_hash.clone(), request.password)
            .await?;

        if !matched {
            let (next, outcome) = LockoutGuard::record_failure(state, now);
            self.users.record_lockout(user.id, &next).await?;

            return match outcome {
                FailureOutcome::Locked { until, .. } => {
                    warn!(user_id = user.id, %until, "Account locked after repeated failures");
                    Err(ApplicationError::AccountLocked)
                }
                FailureOutcome::Invalid { failed_attempts } => {
                    info!(user_id = user.id, failed_attempts, "Failed login");
                    Err(ApplicationError::InvalidCredentials)
                }
            };
        }

        if let Some(cleared) = LockoutGuard::record_success(state) {
            self.users.record_lockout(user.id, &cleared).await?;
        }

        if !user.is_approved {
            return Err(ApplicationError::PendingApproval);
        }

        let session = self.sessions.issue(user.id).await?;
        info!(user_id = user.id, "User logged in");

        Ok(LoginOutcome {
            user_id: user.id,
            session,
        })
    }

    /// Rotate the caller's password and replace every session with a new one
    pub async fn change_password(
        &self,
        user_id: i64,
        request: ChangePasswordRequest,
    ) -> ApplicationResult<SessionToken> {
        if request.current_password.trim().is_empty()
            || request.new_password.trim().is_empty()
        {
            return Err(ApplicationError::validation(
                "currentPassword and newPassword required",
            ));
        }
        PasswordPolicy::validate(&request.new_password)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApplicationError::Unauthenticated)?;

        let matched = self
            .credentials
            .verify_async(user.password_hash, request.current_password)
            .await?;
        if !matched {
            return Err(ApplicationError::IncorrectPassword);
        }

        let password_hash = self.credentials.hash_async(request.new_password).await?;
        self.users.set_password(user_id, &password_hash, false).await?;
        self.sessions.revoke_all(user_id).await?;

        info!(user_id, "Password changed");
        self.sessions.issue(user_id).await
    }

    /// Profile of an already-authorized user
    pub fn me(&self, user: &UserRecord) -> UserInfo {
        user.to_user_info()
    }

    pub async fn list_users(&self) -> ApplicationResult<Vec<UserSummary>> {
        self.users.list().await
    }

    pub async fn promote(&self, request: TargetUserRequest) -> ApplicationResult<i64> {
        let target = request.target()?;
        self.expect_row(self.users.set_admin(target, true).await?)?;
        info!(user_id = target, "User promoted to admin");
        Ok(target)
    }

    pub async fn demote(&self, actor: i64, request: TargetUserRequest) -> ApplicationResult<i64> {
        let target = request.target()?;
        if target == actor {
            return Err(ApplicationError::forbidden(
                "cannot demote your own admin status",
            ));
        }
        self.expect_row(self.users.set_admin(target, false).await?)?;
        info!(user_id = target, "User demoted");
        Ok(target)
    }

    pub async fn approve(&self, request: TargetUserRequest) -> ApplicationResult<i64> {
        let target = request.target()?;
        self.expect_row(self.users.set_approved(target, true).await?)?;
        info!(user_id = target, "User approved");
        Ok(target)
    }

    pub async fn unapprove(&self, actor: i64, request: TargetUserRequest) -> ApplicationResult<i64> {
        let target = request.target()?;
        if target == actor {
            return Err(ApplicationError::forbidden("cannot unapprove your own user"));
        }
        self.expect_row(self.users.set_approved(target, false).await?)?;
        info!(user_id = target, "User unapproved");
        Ok(target)
    }

    pub async fn delete_user(&self, actor: i64, request: TargetUserRequest) -> ApplicationResult<i64> {
        let target = request.target()?;
        if target == actor {
            return Err(ApplicationError::forbidden("cannot delete your own user"));
        }
        self.expect_row(self.users.delete(target).await?)?;
        info!(user_id = target, "User deleted");
        Ok(target)
    }

    /// Set a user's password by email, clearing any lockout and sessions
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ApplicationResult<i64> {
        if request.email.is_empty() || request.new_password.is_empty() {
            return Err(ApplicationError::validation("email and newPassword required"));
        }
        PasswordPolicy::validate(&request.new_password)?;

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| ApplicationError::not_found("user not found"))?;

        let password_hash = self.credentials.hash_async(request.new_password).await?;
        self.users.set_password(user.id, &password_hash, true).await?;
        self.sessions.revoke_all(user.id).await?;

        info!(user_id = user.id, "Password reset by administrator");
        Ok(user.id)
    }

    fn expect_row(&self, rows_affected: u64) -> ApplicationResult<()> {
        if rows_affected == 0 {
            return Err(ApplicationError::not_found("user not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::memory_database;
    use chrono::Duration;
    use logicgrid_core::HashingConfig;

    const PASSWORD: &str = "Abcdef1!";

    struct Fixture {
        accounts: AccountService,
        users: UserStore,
        sessions: SessionManager,
    }

    async fn fixture_with(auto_approve: bool) -> Fixture {
        let database = memory_database().await;
        let users = UserStore::new(database.pool().clone());
        let sessions = SessionManager::new(database.pool().clone());
        let credentials = CredentialStore::new(HashingConfig::fast()).unwrap();
        Fixture {
            accounts: AccountService::new(users.clone(), sessions.clone(), credentials, auto_approve),
            users,
            sessions,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(true).await
    }

    fn signup(email: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_signup_is_admin() {
        let f = fixture().await;

        let first = f.accounts.signup(signup("root@example.com")).await.unwrap();
        assert!(first.is_admin && first.is_approved && first.auto_login);
        assert!(first.session.is_some());

        let second = f.accounts.signup(signup("user@example.com")).await.unwrap();
        assert!(!second.is_admin);
        assert!(second.is_approved);
    }

    #[tokio::test]
    async fn test_signup_without_auto_approval_is_pending() {
        let f = fixture_with(false).await;
        f.accounts.signup(signup("root@example.com")).await.unwrap();

        let pending = f.accounts.signup(signup("user@example.com")).await.unwrap();
        assert!(!pending.is_approved);
        assert!(!pending.auto_login);
        assert!(pending.session.is_none());

        let err = f
            .accounts
            .login(login("user@example.com", PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::PendingApproval));
    }

    #[tokio::test]
    async fn test_signup_rejects_weak_and_duplicate() {
        let f = fixture().await;

        let weak = SignupRequest {
            email: "a@example.com".to_string(),
            password: "password".to_string(),
        };
        assert!(matches!(
            f.accounts.signup(weak).await,
            Err(ApplicationError::Validation { .. })
        ));

        f.accounts.signup(signup("a@example.com")).await.unwrap();
        assert!(matches!(
            f.accounts.signup(signup("a@example.com")).await,
            Err(ApplicationError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn test_unknown_email_is_generic() {
        let f = fixture().await;
        assert!(matches!(
            f.accounts.login(login("nobody@example.com", PASSWORD)).await,
            Err(ApplicationError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_three_strikes_then_lock_expires() {
        let f = fixture().await;
        f.accounts.signup(signup("a@example.com")).await.unwrap();
        let now = Utc::now();

        for _ in 0..2 {
            let err = f
                .accounts
                .login_at(login("a@example.com", "Wrong1!x"), now)
                .await
                .unwrap_err();
            assert!(matches!(err, ApplicationError::InvalidCredentials));
        }

        let err = f
            .accounts
            .login_at(login("a@example.com", "Wrong1!x"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::AccountLocked));

        // The lock blocks even the correct password
        let err = f
            .accounts
            .login_at(login("a@example.com", PASSWORD), now + Duration::minutes(14))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::AccountLocked));

        let outcome = f
            .accounts
            .login_at(login("a@example.com", PASSWORD), now + Duration::minutes(16))
            .await
            .unwrap();

        let user = f.users.find_by_id(outcome.user_id).await.unwrap().unwrap();
        assert_eq!(user.failed_attempts, 0);
        assert_eq!(user.lockout_until, None);
    }

    #[tokio::test]
    async fn test_change_password_rotates_sessions() {
        let f = fixture().await;
        let outcome = f.accounts.signup(signup("a@example.com")).await.unwrap();
        let old = outcome.session.unwrap();

        let err = f
            .accounts
            .change_password(
                outcome.user_id,
                ChangePasswordRequest {
                    current_password: "Wrong1!x".to_string(),
                    new_password: "Zyxwvu9?".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::IncorrectPassword));

        let new = f
            .accounts
            .change_password(
                outcome.user_id,
                ChangePasswordRequest {
                    current_password: PASSWORD.to_string(),
                    new_password: "Zyxwvu9?".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(f.sessions.resolve(old.as_str()).await.unwrap(), None);
        assert_eq!(
            f.sessions.resolve(new.as_str()).await.unwrap(),
            Some(outcome.user_id)
        );
        assert!(f.accounts.login(login("a@example.com", "Zyxwvu9?")).await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_rejects_blank_fields() {
        let f = fixture().await;
        let outcome = f.accounts.signup(signup("a@example.com")).await.unwrap();

        for (current, new) in [("   ", "Zyxwvu9?"), (PASSWORD, "\t ")] {
            let err = f
                .accounts
                .change_password(
                    outcome.user_id,
                    ChangePasswordRequest {
                        current_password: current.to_string(),
                        new_password: new.to_string(),
                    },
                )
                .await
                .unwrap_err();
            assert!(
                matches!(err, ApplicationError::Validation { .. }),
                "{current:?}/{new:?} gave {err:?}"
            );
            assert_eq!(err.to_string(), "currentPassword and newPassword required");
        }
    }

    #[tokio::test]
    async fn test_self_targeting_is_forbidden() {
        let f = fixture().await;
        let admin = f.accounts.signup(signup("root@example.com")).await.unwrap();
        let me = TargetUserRequest {
            user_id: admin.user_id,
        };

        for result in [
            f.accounts.demote(admin.user_id, me).await,
            f.accounts.unapprove(admin.user_id, me).await,
            f.accounts.delete_user(admin.user_id, me).await,
        ] {
            assert!(matches!(result, Err(ApplicationError::Forbidden { .. })));
        }
    }

    #[tokio::test]
    async fn test_admin_actions_on_missing_user() {
        let f = fixture().await;
        let missing = TargetUserRequest { user_id: 999 };

        assert!(matches!(
            f.accounts.promote(missing).await,
            Err(ApplicationError::NotFound { .. })
        ));
        assert!(matches!(
            f.accounts.approve(missing).await,
            Err(ApplicationError::NotFound { .. })
        ));
        assert!(matches!(
            f.accounts.delete_user(1, missing).await,
            Err(ApplicationError::NotFound { .. })
        ));
        assert!(matches!(
            f.accounts.promote(TargetUserRequest { user_id: 0 }).await,
            Err(ApplicationError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_reset_password_clears_lock_and_sessions() {
        let f = fixture().await;
        let outcome = f.accounts.signup(signup("a@example.com")).await.unwrap();
        let session = outcome.session.unwrap();
        for _ in 0..3 {
            let _ = f.accounts.login(login("a@example.com", "Wrong1!x")).await;
        }

        let id = f
            .accounts
            .reset_password(ResetPasswordRequest {
                email: "a@example.com".to_string(),
                new_password: "Zyxwvu9?".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(id, outcome.user_id);
        assert_eq!(f.sessions.resolve(session.as_str()).await.unwrap(), None);
        assert!(f.accounts.login(login("a@example.com", "Zyxwvu9?")).await.is_ok());

        let err = f
            .accounts
            .reset_password(ResetPasswordRequest {
                email: "nobody@example.com".to_string(),
                new_password: "Zyxwvu9?".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }
}
