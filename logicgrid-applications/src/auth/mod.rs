//! Credential policy, hashing, lockout and request authorization

pub mod credentials;
pub mod gate;
pub mod lockout;
pub mod password;

pub use credentials::CredentialStore;
pub use gate::AuthorizationGate;
pub use lockout::{FailureOutcome, LockoutGuard, LockoutState, LockoutStatus};
pub use password::{PasswordPolicy, PolicyError};
