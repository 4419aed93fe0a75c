//! Request guard: resolve a caller from its access/refresh credentials.
//!
//! Verification is stateless (signature + time window). When the access token
//! has expired but is otherwise genuine, a valid refresh token for the same
//! identity mints a replacement access token carrying the refresh token's
//! claims. Nothing here consults the account store.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::claims::{SessionClaims, TokenKind, TokenValidationError, validate_claims};
use crate::config::AuthConfig;
use crate::issuer::{IssuedToken, TokenIssuer};
use crate::{AuthError, Principal};

/// Raw credentials as read from the request (cookie or bearer header).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub access_token: Option<&'a str>,
    pub refresh_token: Option<&'a str>,
}

impl<'a> Credentials<'a> {
    pub fn new(access_token: Option<&'a str>, refresh_token: Option<&'a str>) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}

/// Outcome of a successful [`SessionGuard::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub principal: Principal,
    /// Set when the access token was renewed; the caller must write it back.
    pub rotated_access: Option<IssuedToken>,
}

/// Why a credential was refused. Logged, never returned to clients.
enum Rejection {
    Missing(TokenKind),
    Undecodable(TokenKind, jsonwebtoken::errors::Error),
    WrongKind(TokenKind),
    Window(TokenKind, TokenValidationError),
    IdentityMismatch,
}

impl Rejection {
    fn into_error(self) -> AuthError {
        match self {
            Rejection::Missing(kind) => {
                tracing::debug!(%kind, "credential rejected: missing token");
            }
            Rejection::Undecodable(kind, error) => {
                tracing::debug!(%kind, %error, "credential rejected: undecodable token");
            }
            Rejection::WrongKind(kind) => {
                tracing::debug!(%kind, "credential rejected: token type does not match slot");
            }
            Rejection::Window(kind, error) => {
                tracing::debug!(%kind, %error, "credential rejected: outside validity window");
            }
            Rejection::IdentityMismatch => {
                tracing::debug!("credential rejected: refresh token belongs to another identity");
            }
        }
        AuthError::Unauthenticated
    }
}

#[derive(Clone)]
pub struct SessionGuard {
    issuer: TokenIssuer,
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    validation: Validation,
}

impl SessionGuard {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time window is checked by `validate_claims` against an explicit clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_issuer(&[config.issuer()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        Self {
            issuer: TokenIssuer::new(config),
            access_key: DecodingKey::from_secret(config.access_secret()),
            refresh_key: DecodingKey::from_secret(config.refresh_secret()),
            validation,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Resolve the caller, renewing an expired access token when possible.
    pub fn resolve(
        &self,
        credentials: Credentials<'_>,
        now: DateTime<Utc>,
    ) -> Result<Resolution, AuthError> {
        let access_token = non_empty(credentials.access_token)
            .ok_or(Rejection::Missing(TokenKind::Access))
            .map_err(Rejection::into_error)?;

        let claims = self
            .decode(access_token, TokenKind::Access)
            .map_err(Rejection::into_error)?;

        match validate_claims(&claims, now) {
            Ok(()) => Ok(Resolution {
                principal: claims.principal(),
                rotated_access: None,
            }),
            Err(TokenValidationError::Expired) => {
                self.renew(&claims, credentials.refresh_token, now)
            }
            Err(e) => Err(Rejection::Window(TokenKind::Access, e).into_error()),
        }
    }

    fn renew(
        &self,
        expired: &SessionClaims,
        refresh_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Resolution, AuthError> {
        let refresh_token = non_empty(refresh_token)
            .ok_or(Rejection::Missing(TokenKind::Refresh))
            .map_err(Rejection::into_error)?;

        let refresh = self
            .decode(refresh_token, TokenKind::Refresh)
            .map_err(Rejection::into_error)?;
        validate_claims(&refresh, now)
            .map_err(|e| Rejection::Window(TokenKind::Refresh, e).into_error())?;

        let principal = refresh.principal();
        if !principal.same_identity(&expired.principal()) {
            return Err(Rejection::IdentityMismatch.into_error());
        }

        let rotated = self.issuer.issue_access(&principal, now)?;
        tracing::debug!(
            principal_id = %principal.id,
            entity = %principal.entity,
            "access token renewed from refresh token"
        );

        Ok(Resolution {
            principal,
            rotated_access: Some(rotated),
        })
    }

    fn decode(&self, token: &str, kind: TokenKind) -> Result<SessionClaims, Rejection> {
        let key = match kind {
            TokenKind::Access => &self.access_key,
            TokenKind::Refresh => &self.refresh_key,
        };

        let claims = jsonwebtoken::decode::<SessionClaims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| Rejection::Undecodable(kind, e))?;

        if claims.kind != kind {
            return Err(Rejection::WrongKind(kind));
        }
        Ok(claims)
    }
}

fn non_empty(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use bazaar_core::{EntityKind, PrincipalId};
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use proptest::prelude::*;

    use super::*;
    use crate::Role;

    const ACCESS: &str = "access-secret-access-secret-0123456789";
    const REFRESH: &str = "refresh-secret-refresh-secret-0123456789";

    fn guard() -> SessionGuard {
        SessionGuard::new(&AuthConfig::new(ACCESS, REFRESH).unwrap())
    }

    fn admin_u1() -> Principal {
        Principal::user(PrincipalId::parse("u1").unwrap(), Some(Role::ADMIN))
    }

    fn decode_access(token: &str) -> SessionClaims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        jsonwebtoken::decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(ACCESS.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims
    }

    #[test]
    fn valid_access_token_resolves_without_rotation() {
        let guard = guard();
        let now = Utc::now();
        let pair = guard.issuer().issue(&admin_u1(), now).unwrap();

        let resolved = guard
            .resolve(Credentials::new(Some(&pair.access.token), None), now)
            .unwrap();

        assert_eq!(resolved.principal, admin_u1());
        assert!(resolved.rotated_access.is_none());
    }

    #[test]
    fn no_credentials_is_unauthenticated() {
        let err = guard().resolve(Credentials::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));

        let err = guard()
            .resolve(Credentials::new(Some("   "), None), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn expired_access_with_refresh_rotates_same_identity() {
        let guard = guard();
        let issued_at = Utc::now();
        let pair = guard.issuer().issue(&admin_u1(), issued_at).unwrap();
        let later = issued_at + Duration::hours(2);

        let resolved = guard
            .resolve(
                Credentials::new(Some(&pair.access.token), Some(&pair.refresh.token)),
                later,
            )
            .unwrap();

        assert_eq!(resolved.principal, admin_u1());
        let rotated = resolved.rotated_access.expect("access token should rotate");
        assert_ne!(rotated.token, pair.access.token);

        let claims = decode_access(&rotated.token);
        assert_eq!(claims.sub.as_str(), "u1");
        assert_eq!(claims.entity, EntityKind::User);
        assert_eq!(claims.role, Some(Role::ADMIN));
        assert!(claims.expires_at > later);

        // The rotated token is accepted on its own.
        let again = guard
            .resolve(Credentials::new(Some(&rotated.token), None), later)
            .unwrap();
        assert!(again.rotated_access.is_none());
    }

    #[test]
    fn expired_access_without_refresh_is_unauthenticated() {
        let guard = guard();
        let issued_at = Utc::now();
        let pair = guard.issuer().issue(&admin_u1(), issued_at).unwrap();

        let err = guard
            .resolve(
                Credentials::new(Some(&pair.access.token), None),
                issued_at + Duration::hours(2),
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn expired_refresh_is_unauthenticated() {
        let guard = guard();
        let issued_at = Utc::now();
        let pair = guard.issuer().issue(&admin_u1(), issued_at).unwrap();

        let err = guard
            .resolve(
                Credentials::new(Some(&pair.access.token), Some(&pair.refresh.token)),
                issued_at + Duration::days(8),
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn tampered_payload_is_rejected_even_with_valid_refresh() {
        let guard = guard();
        let now = Utc::now();
        let pair = guard.issuer().issue(&admin_u1(), now).unwrap();

        // Swap in a payload claiming a different subject, keep the old signature.
        let mut forged = decode_access(&pair.access.token);
        forged.sub = PrincipalId::parse("u2").unwrap();
        let forged_payload = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &forged,
            &EncodingKey::from_secret(b"some-other-secret-some-other-secret"),
        )
        .unwrap();
        let mut parts: Vec<&str> = pair.access.token.split('.').collect();
        let forged_parts: Vec<&str> = forged_payload.split('.').collect();
        parts[1] = forged_parts[1];
        let tampered = parts.join(".");

        for at in [now, now + Duration::hours(2)] {
            let err = guard
                .resolve(Credentials::new(Some(&tampered), Some(&pair.refresh.token)), at)
                .unwrap_err();
            assert!(matches!(err, AuthError::Unauthenticated));
        }
    }

    #[test]
    fn token_signed_with_wrong_secret_is_rejected() {
        let other = SessionGuard::new(
            &AuthConfig::new(
                "another-access-secret-0123456789abcdef",
                "another-refresh-secret-0123456789abcdef",
            )
            .unwrap(),
        );
        let now = Utc::now();
        let pair = other.issuer().issue(&admin_u1(), now).unwrap();

        let err = guard()
            .resolve(Credentials::new(Some(&pair.access.token), None), now)
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn refresh_token_in_access_slot_is_rejected() {
        let guard = guard();
        let now = Utc::now();
        let pair = guard.issuer().issue(&admin_u1(), now).unwrap();

        let err = guard
            .resolve(Credentials::new(Some(&pair.refresh.token), None), now)
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn refresh_for_another_identity_does_not_renew() {
        let guard = guard();
        let issued_at = Utc::now();
        let mine = guard.issuer().issue(&admin_u1(), issued_at).unwrap();
        let theirs = guard
            .issuer()
            .issue(
                &Principal::company(PrincipalId::parse("u1").unwrap(), None),
                issued_at,
            )
            .unwrap();

        let err = guard
            .resolve(
                Credentials::new(Some(&mine.access.token), Some(&theirs.refresh.token)),
                issued_at + Duration::hours(2),
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let config = AuthConfig::new(ACCESS, REFRESH).unwrap().with_issuer("elsewhere");
        let foreign = SessionGuard::new(&config);
        let now = Utc::now();
        let pair = foreign.issuer().issue(&admin_u1(), now).unwrap();

        let err = guard()
            .resolve(Credentials::new(Some(&pair.access.token), None), now)
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn refresh_under_another_key_does_not_renew() {
        let guard = guard();
        let issued_at = Utc::now();
        let pair = guard.issuer().issue(&admin_u1(), issued_at).unwrap();

        // Same access key and issuer, different refresh key.
        let other = SessionGuard::new(
            &AuthConfig::new(ACCESS, "another-refresh-secret-0123456789abcdef").unwrap(),
        );
        let foreign = other.issuer().issue(&admin_u1(), issued_at).unwrap();

        let err = guard
            .resolve(
                Credentials::new(Some(&pair.access.token), Some(&foreign.refresh.token)),
                issued_at + Duration::hours(2),
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn tampered_refresh_payload_does_not_renew() {
        let guard = guard();
        let issued_at = Utc::now();
        let user = Principal::user(PrincipalId::parse("u1").unwrap(), Some(Role::USER));
        let pair = guard.issuer().issue(&user, issued_at).unwrap();

        // Escalate the role inside the refresh payload, keep the original signature.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let mut escalated = jsonwebtoken::decode::<SessionClaims>(
            &pair.refresh.token,
            &DecodingKey::from_secret(REFRESH.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;
        escalated.role = Some(Role::ADMIN);
        let reencoded = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &escalated,
            &EncodingKey::from_secret(b"some-other-secret-some-other-secret"),
        )
        .unwrap();
        let mut parts: Vec<&str> = pair.refresh.token.split('.').collect();
        let reencoded_parts: Vec<&str> = reencoded.split('.').collect();
        parts[1] = reencoded_parts[1];
        let tampered = parts.join(".");

        let err = guard
            .resolve(
                Credentials::new(Some(&pair.access.token), Some(&tampered)),
                issued_at + Duration::hours(2),
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn not_yet_valid_access_does_not_fall_through_to_refresh() {
        let guard = guard();
        let now = Utc::now();
        let valid = guard.issuer().issue(&admin_u1(), now).unwrap();
        let future = guard
            .issuer()
            .issue(&admin_u1(), now + Duration::minutes(30))
            .unwrap();

        let err = guard
            .resolve(
                Credentials::new(Some(&future.access.token), Some(&valid.refresh.token)),
                now,
            )
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    fn principal_strategy() -> impl Strategy<Value = Principal> {
        (
            "[A-Za-z0-9_-]{1,40}",
            prop_oneof![Just(EntityKind::User), Just(EntityKind::Company)],
            proptest::option::of(prop_oneof![
                Just(Role::ADMIN),
                Just(Role::MODERATOR),
                Just(Role::USER),
                "[A-Z_]{1,12}".prop_map(|name| Role::new(name)),
            ]),
        )
            .prop_map(|(id, entity, role)| {
                Principal::new(PrincipalId::parse(id).unwrap(), entity, role)
            })
    }

    proptest! {
        #[test]
        fn issued_access_token_resolves_to_same_principal(principal in principal_strategy()) {
            let guard = guard();
            let now = Utc::now();
            let pair = guard.issuer().issue(&principal, now).unwrap();

            let resolved = guard
                .resolve(Credentials::new(Some(&pair.access.token), None), now)
                .unwrap();
            prop_assert_eq!(resolved.principal, principal);
            prop_assert!(resolved.rotated_access.is_none());
        }
    }
}
