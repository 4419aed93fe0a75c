use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use bazaar_auth::ensure_owner;
use bazaar_core::OfferId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

/// POST /offers/:id/toggle-active - only the offer's owner may flip it.
pub async fn toggle_active(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let offer_id: OfferId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let Some(offer) = services.offer(offer_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "offer not found");
    };

    if let Err(e) = ensure_owner(principal.principal(), &offer.owner_id, offer.owner_entity) {
        return errors::auth_error_to_response(e);
    }

    match services.toggle_offer_active(offer_id) {
        Ok(offer) => (StatusCode::OK, Json(dto::OfferResponse::from(&offer))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
