//! Token issuance.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use thiserror::Error;

use crate::claims::{SessionClaims, TokenKind};
use crate::config::AuthConfig;
use crate::Principal;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("failed to sign {kind} token: {source}")]
    Signing {
        kind: TokenKind,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
}

/// An encoded token plus its validity window (for cookie `Max-Age`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Token lifetime in seconds, clamped at zero.
    pub fn max_age_secs(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds().max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Signs access and refresh tokens with separate keys and lifetimes.
#[derive(Clone)]
pub struct TokenIssuer {
    access_key: EncodingKey,
    refresh_key: EncodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.access_secret()),
            refresh_key: EncodingKey::from_secret(config.refresh_secret()),
            issuer: config.issuer().to_string(),
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
        }
    }

    /// Mint a fresh access/refresh pair at login.
    pub fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<TokenPair, IssueError> {
        Ok(TokenPair {
            access: self.issue_access(principal, now)?,
            refresh: self.sign(principal, TokenKind::Refresh, now)?,
        })
    }

    /// Mint only an access token (renewal path).
    pub fn issue_access(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, IssueError> {
        self.sign(principal, TokenKind::Access, now)
    }

    fn sign(
        &self,
        principal: &Principal,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, IssueError> {
        let (key, ttl) = match kind {
            TokenKind::Access => (&self.access_key, self.access_ttl),
            TokenKind::Refresh => (&self.refresh_key, self.refresh_ttl),
        };

        let claims = SessionClaims::new(principal, kind, &self.issuer, now, ttl);
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|source| IssueError::Signing { kind, source })?;

        Ok(IssuedToken {
            token,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use bazaar_core::PrincipalId;
    use jsonwebtoken::{DecodingKey, Validation};

    use super::*;
    use crate::Role;

    const ACCESS: &str = "access-secret-access-secret-0123456789";
    const REFRESH: &str = "refresh-secret-refresh-secret-0123456789";

    fn decode(token: &str, secret: &str) -> jsonwebtoken::errors::Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        jsonwebtoken::decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .map(|data| data.claims)
    }

    #[test]
    fn access_and_refresh_use_distinct_keys_and_lifetimes() {
        let issuer = TokenIssuer::new(&AuthConfig::new(ACCESS, REFRESH).unwrap());
        let principal = Principal::user(PrincipalId::parse("u1").unwrap(), Some(Role::ADMIN));
        let now = Utc::now();

        let pair = issuer.issue(&principal, now).unwrap();

        let access = decode(&pair.access.token, ACCESS).unwrap();
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.principal(), principal);
        assert_eq!(access.expires_at - access.issued_at, Duration::hours(1));

        let refresh = decode(&pair.refresh.token, REFRESH).unwrap();
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(refresh.expires_at - refresh.issued_at, Duration::days(7));

        assert!(decode(&pair.access.token, REFRESH).is_err());
        assert!(decode(&pair.refresh.token, ACCESS).is_err());
    }

    #[test]
    fn tokens_minted_in_the_same_second_differ() {
        let issuer = TokenIssuer::new(&AuthConfig::new(ACCESS, REFRESH).unwrap());
        let principal = Principal::company(PrincipalId::parse("c1").unwrap(), None);
        let now = Utc::now();

        let a = issuer.issue_access(&principal, now).unwrap();
        let b = issuer.issue_access(&principal, now).unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(a.expires_at, b.expires_at);
    }

    #[test]
    fn max_age_is_the_full_lifetime() {
        let issuer = TokenIssuer::new(&AuthConfig::new(ACCESS, REFRESH).unwrap());
        let principal = Principal::user(PrincipalId::parse("u1").unwrap(), None);

        let pair = issuer.issue(&principal, Utc::now()).unwrap();
        assert_eq!(pair.access.max_age_secs(), 3600);
        assert_eq!(pair.refresh.max_age_secs(), 7 * 24 * 3600);

        let now = Utc::now();
        let inverted = IssuedToken {
            token: String::new(),
            issued_at: now,
            expires_at: now - Duration::seconds(5),
        };
        assert_eq!(inverted.max_age_secs(), 0);
    }
}
