//! External identity federation
//!
//! OAuth 2.0 authorization-code login against an external provider. The
//! provider's identity token is mapped onto a local user by email, and the
//! caller then receives an ordinary session, so nothing downstream can tell
//! a federated session from a password one.

pub mod config;
pub mod exchange;
pub mod id_token;
pub mod service;

pub use config::FederationConfig;
pub use exchange::{CodeExchanger, HttpCodeExchanger, TokenResponse};
pub use id_token::email_from_id_token;
pub use service::{AuthorizationRequest, IdentityFederation};
