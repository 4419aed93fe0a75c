//! Token signing configuration.
//!
//! Secrets are mandatory: there is no built-in default, and a missing or weak
//! secret is a startup failure.

use chrono::Duration;
use thiserror::Error;

pub const ACCESS_SECRET_VAR: &str = "BAZAAR_ACCESS_TOKEN_SECRET";
pub const REFRESH_SECRET_VAR: &str = "BAZAAR_REFRESH_TOKEN_SECRET";
pub const ISSUER_VAR: &str = "BAZAAR_TOKEN_ISSUER";
pub const ACCESS_TTL_VAR: &str = "BAZAAR_ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TTL_VAR: &str = "BAZAAR_REFRESH_TOKEN_TTL_SECS";

/// Minimum secret length in bytes (HS256 key size).
pub const MIN_SECRET_LEN: usize = 32;

pub const DEFAULT_ISSUER: &str = "bazaar";
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} must be at least {min} bytes")]
    WeakSecret { var: &'static str, min: usize },

    #[error("access and refresh token secrets must differ")]
    SharedSecret,

    #[error("{var} has invalid value '{value}'")]
    InvalidValue { var: &'static str, value: String },

    #[error("refresh token lifetime must exceed access token lifetime")]
    RefreshNotLonger,
}

/// Signing keys, issuer and lifetimes for session tokens.
#[derive(Clone)]
pub struct AuthConfig {
    access_secret: String,
    refresh_secret: String,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AuthConfig {
    /// Build a config with default issuer and lifetimes.
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let access_secret = access_secret.into();
        let refresh_secret = refresh_secret.into();

        check_secret(ACCESS_SECRET_VAR, &access_secret)?;
        check_secret(REFRESH_SECRET_VAR, &refresh_secret)?;
        if access_secret == refresh_secret {
            return Err(ConfigError::SharedSecret);
        }

        Ok(Self {
            access_secret,
            refresh_secret,
            issuer: DEFAULT_ISSUER.to_string(),
            access_ttl: Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
        })
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_ttls(mut self, access: Duration, refresh: Duration) -> Result<Self, ConfigError> {
        if access <= Duration::zero() {
            return Err(ConfigError::InvalidValue {
                var: ACCESS_TTL_VAR,
                value: access.num_seconds().to_string(),
            });
        }
        if refresh <= access {
            return Err(ConfigError::RefreshNotLonger);
        }
        self.access_ttl = access;
        self.refresh_ttl = refresh;
        Ok(self)
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_secret = lookup(ACCESS_SECRET_VAR).ok_or(ConfigError::Missing(ACCESS_SECRET_VAR))?;
        let refresh_secret =
            lookup(REFRESH_SECRET_VAR).ok_or(ConfigError::Missing(REFRESH_SECRET_VAR))?;

        let mut config = Self::new(access_secret, refresh_secret)?;

        if let Some(issuer) = lookup(ISSUER_VAR).filter(|s| !s.trim().is_empty()) {
            config = config.with_issuer(issuer);
        }

        let access_ttl = parse_secs(&lookup, ACCESS_TTL_VAR, DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_ttl = parse_secs(&lookup, REFRESH_TTL_VAR, DEFAULT_REFRESH_TTL_SECS)?;
        config.with_ttls(Duration::seconds(access_ttl), Duration::seconds(refresh_ttl))
    }

    pub fn access_secret(&self) -> &[u8] {
        self.access_secret.as_bytes()
    }

    pub fn refresh_secret(&self) -> &[u8] {
        self.refresh_secret.as_bytes()
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

fn check_secret(var: &'static str, secret: &str) -> Result<(), ConfigError> {
    if secret.trim().is_empty() {
        return Err(ConfigError::Missing(var));
    }
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::WeakSecret {
            var,
            min: MIN_SECRET_LEN,
        });
    }
    Ok(())
}

fn parse_secs<F>(lookup: &F, var: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidValue { var, value: raw }),
        },
    }
}
