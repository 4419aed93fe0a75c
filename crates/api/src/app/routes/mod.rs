use axum::{
    routing::{delete, get, post},
    Router,
};

pub mod offers;
pub mod reports;
pub mod session;
pub mod system;

/// Routes reachable without a session.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/login", post(session::login))
        .route("/auth/logout", post(session::logout))
}

/// Routes behind the session guard.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/session", get(session::current))
        .route("/reports/:id/approve", post(reports::approve))
        .route("/reports/:id/reject", post(reports::reject))
        .route("/reports/:id", delete(reports::remove))
        .route("/offers/:id/toggle-active", post(offers::toggle_active))
}
