use thiserror::Error;

use crate::issuer::IssueError;

/// Failure of the session guard or an authorization check.
///
/// The reason a credential was rejected is deliberately not carried here:
/// missing, tampered and expired credentials all look the same to callers.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Re-signing a renewed token failed (misconfiguration, not a client error).
    #[error(transparent)]
    Issue(#[from] IssueError),
}

impl AuthError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}
