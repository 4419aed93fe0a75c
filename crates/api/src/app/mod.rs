//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: data wiring (account store seam, reports, offers)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use bazaar_auth::{AuthConfig, SessionGuard};

use crate::cookies::CookiePolicy;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(auth: &AuthConfig, cookies: CookiePolicy, services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        guard: Arc::new(SessionGuard::new(auth)),
        cookies,
    };

    // Protected routes: the session guard runs first.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(Extension(auth_state)),
        )
}
