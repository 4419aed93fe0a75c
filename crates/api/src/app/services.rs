//! Marketplace data wiring.
//!
//! Accounts come in through the [`AccountStore`] seam; reports and offers are
//! kept in process memory (the listing/moderation persistence layer is not
//! part of this service).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use bazaar_auth::{AccountStore, Principal};
use bazaar_core::{DomainError, DomainResult, EntityKind, OfferId, PrincipalId, ReportId};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
        }
    }
}

/// A user complaint about an offer, awaiting moderation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub id: ReportId,
    pub offer_id: OfferId,
    pub reason: String,
    pub status: ReportStatus,
    /// Who filed the report.
    pub reporter: Principal,
}

/// A marketplace listing owned by a user or a company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    pub owner_id: PrincipalId,
    pub owner_entity: EntityKind,
    pub active: bool,
}

/// Keyed in-memory table. Lock poisoning reads as "absent".
#[derive(Debug)]
struct Table<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        self.inner.read().ok()?.get(key).cloned()
    }

    fn insert(&self, key: K, value: V) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key, value);
        }
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().ok()?.remove(key)
    }

    /// Apply `f` to the stored value under the write lock.
    fn update(&self, key: &K, f: impl FnOnce(&mut V)) -> Option<V> {
        let mut map = self.inner.write().ok()?;
        let value = map.get_mut(key)?;
        f(value);
        Some(value.clone())
    }
}

/// Everything handlers need beyond the session guard.
pub struct AppServices {
    pub accounts: Arc<dyn AccountStore>,
    reports: Table<ReportId, Report>,
    offers: Table<OfferId, Offer>,
}

impl AppServices {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            accounts,
            reports: Table::default(),
            offers: Table::default(),
        }
    }

    // -------------------------
    // Reports
    // -------------------------

    pub fn file_report(
        &self,
        reporter: &Principal,
        offer_id: OfferId,
        reason: impl Into<String>,
    ) -> Report {
        let report = Report {
            id: ReportId::new(),
            offer_id,
            reason: reason.into(),
            status: ReportStatus::Pending,
            reporter: reporter.clone(),
        };
        self.reports.insert(report.id, report.clone());
        report
    }

    pub fn report(&self, id: ReportId) -> Option<Report> {
        self.reports.get(&id)
    }

    pub fn set_report_status(&self, id: ReportId, status: ReportStatus) -> DomainResult<Report> {
        self.reports
            .update(&id, |r| r.status = status)
            .ok_or_else(DomainError::not_found)
    }

    pub fn delete_report(&self, id: ReportId) -> DomainResult<Report> {
        self.reports.remove(&id).ok_or_else(DomainError::not_found)
    }

    // -------------------------
    // Offers
    // -------------------------

    pub fn create_offer(&self, owner: &Principal, title: impl Into<String>) -> Offer {
        let offer = Offer {
            id: OfferId::new(),
            title: title.into(),
            owner_id: owner.id.clone(),
            owner_entity: owner.entity,
            active: true,
        };
        self.offers.insert(offer.id, offer.clone());
        offer
    }

    pub fn offer(&self, id: OfferId) -> Option<Offer> {
        self.offers.get(&id)
    }

    pub fn toggle_offer_active(&self, id: OfferId) -> DomainResult<Offer> {
        self.offers
            .update(&id, |o| o.active = !o.active)
            .ok_or_else(DomainError::not_found)
    }
}
