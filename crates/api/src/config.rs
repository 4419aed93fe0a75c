//! Process configuration, read once at startup.

use std::net::SocketAddr;

use thiserror::Error;

use bazaar_auth::{AuthConfig, ConfigError};
use bazaar_observability::LogFormat;

use crate::cookies::CookiePolicy;

pub const BIND_ADDR_VAR: &str = "BAZAAR_BIND_ADDR";
pub const ENV_VAR: &str = "BAZAAR_ENV";
pub const LOG_FORMAT_VAR: &str = "BAZAAR_LOG_FORMAT";
pub const BOOTSTRAP_ADMIN_EMAIL_VAR: &str = "BAZAAR_BOOTSTRAP_ADMIN_EMAIL";
pub const BOOTSTRAP_ADMIN_PASSWORD_VAR: &str = "BAZAAR_BOOTSTRAP_ADMIN_PASSWORD";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ApiConfigError {
    #[error(transparent)]
    Auth(#[from] ConfigError),

    #[error("{var} has invalid value '{value}': {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

/// Credentials for an ADMIN user account created at startup.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    pub cookies: CookiePolicy,
    pub log_format: LogFormat,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth = AuthConfig::from_lookup(&lookup)?;

        let raw_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| ApiConfigError::InvalidValue {
                var: BIND_ADDR_VAR,
                value: raw_addr.clone(),
                reason: e.to_string(),
            })?;

        let production = match lookup(ENV_VAR).as_deref().map(str::trim) {
            None | Some("") | Some("development") | Some("dev") | Some("test") => false,
            Some("production") | Some("prod") => true,
            Some(other) => {
                return Err(ApiConfigError::InvalidValue {
                    var: ENV_VAR,
                    value: other.to_string(),
                    reason: "expected development, test or production".to_string(),
                });
            }
        };

        let log_format = match lookup(LOG_FORMAT_VAR) {
            None => LogFormat::default(),
            Some(raw) => raw.parse().map_err(|reason| ApiConfigError::InvalidValue {
                var: LOG_FORMAT_VAR,
                value: raw.clone(),
                reason,
            })?,
        };

        let bootstrap_admin = match (
            lookup(BOOTSTRAP_ADMIN_EMAIL_VAR),
            lookup(BOOTSTRAP_ADMIN_PASSWORD_VAR),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => {
                return Err(ApiConfigError::Incomplete(
                    BOOTSTRAP_ADMIN_EMAIL_VAR,
                    BOOTSTRAP_ADMIN_PASSWORD_VAR,
                ));
            }
        };

        Ok(Self {
            bind_addr,
            auth,
            cookies: CookiePolicy::new(production),
            log_format,
            bootstrap_admin,
        })
    }
}
