use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use bazaar_core::{EntityKind, PrincipalId};

use crate::{Principal, Role};

/// Which credential slot a token was minted for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims carried by both access and refresh tokens.
///
/// Timestamps are encoded as the registered `iat`/`exp` claims (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Account table the subject belongs to.
    pub entity: EntityKind,

    /// Role at the time the session was established.
    pub role: Option<Role>,

    #[serde(rename = "typ")]
    pub kind: TokenKind,

    pub iss: String,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,

    /// Unique token id; two tokens minted in the same second still differ.
    pub jti: Uuid,
}

impl SessionClaims {
    pub fn new(
        principal: &Principal,
        kind: TokenKind,
        issuer: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let issued_at = now.trunc_subsecs(0);
        Self {
            sub: principal.id.clone(),
            entity: principal.entity,
            role: principal.role.clone(),
            kind,
            iss: issuer.to_string(),
            issued_at,
            expires_at: issued_at + ttl,
            jti: Uuid::new_v4(),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.sub.clone(), self.entity, self.role.clone())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature verification happens before this, in the guard.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_at(now: DateTime<Utc>) -> SessionClaims {
        let principal = Principal::user(PrincipalId::parse("u1").unwrap(), Some(Role::USER));
        SessionClaims::new(&principal, TokenKind::Access, "bazaar", now, Duration::hours(1))
    }

    #[test]
    fn window_is_half_open() {
        let now = Utc::now();
        let claims = claims_at(now);

        assert_eq!(validate_claims(&claims, claims.issued_at), Ok(()));
        assert_eq!(
            validate_claims(&claims, claims.expires_at - Duration::seconds(1)),
            Ok(())
        );
        assert_eq!(
            validate_claims(&claims, claims.expires_at),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_issued_at_is_not_yet_valid() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::minutes(5));
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut claims = claims_at(Utc::now());
        claims.expires_at = claims.issued_at;
        assert_eq!(
            validate_claims(&claims, claims.issued_at),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn serializes_registered_claim_names() {
        let claims = claims_at(Utc::now());
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["sub"], "u1");
        assert_eq!(json["entity"], "user");
        assert_eq!(json["role"], "USER");
        assert_eq!(json["typ"], "access");
        assert_eq!(json["iat"], claims.issued_at.timestamp());
        assert_eq!(json["exp"], claims.expires_at.timestamp());
    }

    #[test]
    fn null_role_round_trips() {
        let principal = Principal::company(PrincipalId::parse("c1").unwrap(), None);
        let claims = SessionClaims::new(
            &principal,
            TokenKind::Refresh,
            "bazaar",
            Utc::now(),
            Duration::days(7),
        );
        let json = serde_json::to_string(&claims).unwrap();
        let back: SessionClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(back.principal(), principal);
    }
}
