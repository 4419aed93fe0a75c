use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use bazaar_auth::{Credentials, SessionGuard};

use crate::app::errors;
use crate::context::PrincipalContext;
use crate::cookies::{self, CookiePolicy};

/// Shared session state: guard (verification + issuance) and cookie policy.
#[derive(Clone)]
pub struct AuthState {
    pub guard: Arc<SessionGuard>,
    pub cookies: CookiePolicy,
}

/// Resolve the caller before protected handlers run.
///
/// On success the principal is inserted as a [`PrincipalContext`] extension.
/// If the guard renewed the access token, the new cookie is appended to the
/// handler's response.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let now = Utc::now();
    let credentials = Credentials::new(
        cookies::access_token(&jar, req.headers()),
        cookies::refresh_token(&jar),
    );

    let resolution = state
        .guard
        .resolve(credentials, now)
        .map_err(errors::auth_error_to_response)?;

    req.extensions_mut()
        .insert(PrincipalContext::new(resolution.principal));

    let mut response = next.run(req).await;

    if let Some(rotated) = resolution.rotated_access {
        let cookie = state
            .cookies
            .session_cookie(cookies::ACCESS_COOKIE, &rotated);
        let value = HeaderValue::from_str(&cookie).map_err(|e| {
            tracing::error!(error = %e, "rotated access token is not a valid header value");
            errors::internal_error()
        })?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    Ok(response)
}
