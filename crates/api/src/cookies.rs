//! Session cookie formatting and credential extraction.

use axum::http::{header, HeaderMap};
use axum_extra::extract::CookieJar;

use bazaar_auth::IssuedToken;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Cookie attributes that depend on the deployment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CookiePolicy {
    /// Add the `Secure` attribute (production only; plain-HTTP dev would drop it).
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// `Set-Cookie` value carrying a freshly issued token.
    pub fn session_cookie(&self, name: &str, token: &IssuedToken) -> String {
        self.format(name, &token.token, token.max_age_secs())
    }

    /// `Set-Cookie` value that overwrites `name` with an already-expired cookie.
    pub fn clearing_cookie(&self, name: &str) -> String {
        self.format(name, "", 0)
    }

    fn format(&self, name: &str, value: &str, max_age: i64) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}{}",
            name,
            value,
            max_age,
            if self.secure { "; Secure" } else { "" }
        )
    }
}

/// Access token from the cookie, falling back to an `Authorization: Bearer` header.
pub fn access_token<'a>(jar: &'a CookieJar, headers: &'a HeaderMap) -> Option<&'a str> {
    jar.get(ACCESS_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
        .or_else(|| bearer(headers))
}

pub fn refresh_token(jar: &CookieJar) -> Option<&str> {
    jar.get(REFRESH_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
