//! Moderation endpoints (ADMIN or MODERATOR).
//!
//! The role is re-read from the account store on every call, so a demotion
//! takes effect before the session token expires.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use bazaar_auth::{authorize_current, MODERATION_ROLES};
use bazaar_core::ReportId;

use crate::app::services::{AppServices, ReportStatus};
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

/// POST /reports/:id/approve
pub async fn approve(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    moderate(&services, &principal, &id, ReportStatus::Approved)
}

/// POST /reports/:id/reject
pub async fn reject(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    moderate(&services, &principal, &id, ReportStatus::Rejected)
}

/// DELETE /reports/:id
pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let report_id: ReportId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let moderator = match authorize_current(services.accounts.as_ref(), principal.principal(), &MODERATION_ROLES) {
        Ok(p) => p,
        Err(e) => return errors::auth_error_to_response(e),
    };

    match services.delete_report(report_id) {
        Ok(_) => {
            tracing::info!(report_id = %report_id, moderator = %moderator.id, "report deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn moderate(
    services: &AppServices,
    principal: &PrincipalContext,
    id: &str,
    status: ReportStatus,
) -> axum::response::Response {
    let report_id: ReportId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let moderator = match authorize_current(services.accounts.as_ref(), principal.principal(), &MODERATION_ROLES) {
        Ok(p) => p,
        Err(e) => return errors::auth_error_to_response(e),
    };

    match services.set_report_status(report_id, status) {
        Ok(report) => {
            tracing::info!(
                report_id = %report_id,
                moderator = %moderator.id,
                status = status.as_str(),
                "report moderated"
            );
            (StatusCode::OK, Json(dto::ReportResponse::from(&report))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
