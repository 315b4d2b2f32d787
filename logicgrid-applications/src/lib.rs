//! LogicGrid Applications - identity, session and protocol services
//!
//! This crate holds every stateful rule of the system:
//!
//! - credential policy, hashing and lockout ([`auth`])
//! - opaque session tokens ([`session`])
//! - account and administration flows ([`accounts`])
//! - external identity federation ([`federation`])
//! - protocol ownership and visibility ([`protocol`])
//! - the quota-gated action suggester seam ([`suggest`])
//!
//! ## Architecture
//!
//! - **Core** (logicgrid-core): configuration, logging, error context
//! - **Applications** (this crate): domain services over SQLite
//! - **Presentation** (logicgrid-web): HTTP transport and cookies

pub mod accounts;
pub mod auth;
pub mod database;
pub mod federation;
pub mod protocol;
pub mod session;
pub mod suggest;
pub mod users;

pub use accounts::{
    AccountService, ChangePasswordRequest, LoginOutcome, LoginRequest, ResetPasswordRequest,
    SignupOutcome, SignupRequest, TargetUserRequest,
};
pub use auth::{
    AuthorizationGate, CredentialStore, FailureOutcome, LockoutGuard, LockoutState,
    LockoutStatus, PasswordPolicy, PolicyError,
};
pub use database::Database;
pub use federation::{
    AuthorizationRequest, CodeExchanger, FederationConfig, HttpCodeExchanger, IdentityFederation,
    TokenResponse,
};
pub use protocol::{
    CommandOutcome, ListScope, Protocol, ProtocolCommand, ProtocolRequest, ProtocolStore,
    ProtocolSummary, SaveOutcome, SaveProtocol, Visibility,
};
pub use session::{SessionManager, SessionToken};
pub use suggest::{
    ActionSuggester, GeminiSuggester, SuggestRequest, SuggestedAction, SuggestionResponse,
    SuggestionService,
};
pub use users::{NewUser, UserInfo, UserRecord, UserStore, UserSummary};

use logicgrid_core::LogicGridError;

/// Application-level error type
///
/// Each variant corresponds to one caller-visible failure category. The
/// presentation layer decides the status code; messages on the
/// enumeration-sensitive variants are deliberately generic.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("{message}")]
    Validation { message: String },

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthenticated,

    #[error("current password is incorrect")]
    IncorrectPassword,

    #[error("Account locked. Too many failed attempts. Please try again in 15 minutes.")]
    AccountLocked,

    #[error("account pending approval")]
    PendingApproval,

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("email may already exist")]
    DuplicateEmail,

    #[error("{message}")]
    QuotaExceeded { message: String },

    #[error("invalid state")]
    InvalidState,

    #[error("Federation error: {message}")]
    Federation { message: String },

    #[error("Suggestion error: {message}")]
    Suggestion { message: String },

    #[error("Password hashing error: {message}")]
    Hashing { message: String },

    #[error("Core error: {0}")]
    Core(#[from] LogicGridError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApplicationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}

/// Result type for application operations
pub type ApplicationResult<T> = Result<T, ApplicationError>;
