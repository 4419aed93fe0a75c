//! Login, logout and session introspection.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use chrono::Utc;

use bazaar_auth::authenticate;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;
use crate::cookies::{ACCESS_COOKIE, REFRESH_COOKIE};
use crate::middleware::AuthState;

/// POST /auth/login - check credentials, set both session cookies.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthState>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    if body.email.trim().is_empty() || body.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "email and password are required",
        );
    }

    let principal = match authenticate(
        services.accounts.as_ref(),
        body.entity,
        body.email.trim(),
        &body.password,
    ) {
        Ok(p) => p,
        Err(e) => return errors::auth_error_to_response(e),
    };

    let now = Utc::now();
    let pair = match auth.guard.issuer().issue(&principal, now) {
        Ok(pair) => pair,
        Err(e) => return errors::auth_error_to_response(e.into()),
    };

    tracing::info!(
        principal_id = %principal.id,
        entity = %principal.entity,
        "login succeeded"
    );

    (
        StatusCode::OK,
        AppendHeaders([
            (
                header::SET_COOKIE,
                auth.cookies.session_cookie(ACCESS_COOKIE, &pair.access),
            ),
            (
                header::SET_COOKIE,
                auth.cookies.session_cookie(REFRESH_COOKIE, &pair.refresh),
            ),
        ]),
        Json(serde_json::json!({
            "principal": dto::PrincipalResponse::from(&principal),
        })),
    )
        .into_response()
}

/// POST /auth/logout - overwrite both cookies with expired ones.
///
/// Works without a valid session so a client can always clear stale cookies.
pub async fn logout(Extension(auth): Extension<AuthState>) -> axum::response::Response {
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (header::SET_COOKIE, auth.cookies.clearing_cookie(ACCESS_COOKIE)),
            (header::SET_COOKIE, auth.cookies.clearing_cookie(REFRESH_COOKIE)),
        ]),
    )
        .into_response()
}

/// GET /auth/session - the identity carried by the current session.
pub async fn current(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(dto::PrincipalResponse::from(principal.principal()))
}
