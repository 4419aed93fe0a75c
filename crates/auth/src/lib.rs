//! `bazaar-auth` — session tokens and authorization for the marketplace.
//!
//! This crate is decoupled from HTTP: callers hand it raw credentials and a
//! clock reading, and translate its errors into responses themselves.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod error;
pub mod guard;
pub mod issuer;
pub mod password;
pub mod principal;
pub mod roles;
pub mod store;

pub use authorize::{authorize, authorize_current, ensure_owner, is_owner};
pub use claims::{SessionClaims, TokenKind, TokenValidationError, validate_claims};
pub use config::{AuthConfig, ConfigError};
pub use error::AuthError;
pub use guard::{Credentials, Resolution, SessionGuard};
pub use issuer::{IssueError, IssuedToken, TokenIssuer, TokenPair};
pub use password::{PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use roles::{MODERATION_ROLES, Role};
pub use store::{Account, AccountStore, InMemoryAccountStore, authenticate};
