use serde::{Deserialize, Serialize};

use bazaar_auth::Principal;
use bazaar_core::EntityKind;

use crate::app::services::{Offer, Report};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub entity: EntityKind,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub id: String,
    pub entity: EntityKind,
    pub role: Option<String>,
}

impl From<&Principal> for PrincipalResponse {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id.to_string(),
            entity: p.entity,
            role: p.role.as_ref().map(|r| r.as_str().to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: String,
    pub offer_id: String,
    pub reason: String,
    pub status: &'static str,
    pub reporter: PrincipalResponse,
}

impl From<&Report> for ReportResponse {
    fn from(r: &Report) -> Self {
        Self {
            id: r.id.to_string(),
            offer_id: r.offer_id.to_string(),
            reason: r.reason.clone(),
            status: r.status.as_str(),
            reporter: PrincipalResponse::from(&r.reporter),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    pub owner_entity: EntityKind,
    pub active: bool,
}

impl From<&Offer> for OfferResponse {
    fn from(o: &Offer) -> Self {
        Self {
            id: o.id.to_string(),
            title: o.title.clone(),
            owner_id: o.owner_id.to_string(),
            owner_entity: o.owner_entity,
            active: o.active,
        }
    }
}
