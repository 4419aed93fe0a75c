use bazaar_auth::{Principal, Role};
use bazaar_core::{EntityKind, PrincipalId};

/// Principal context for a request (identity resolved by the session guard).
///
/// Inserted as a request extension by the auth middleware; handlers behind
/// the middleware can rely on it being present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn id(&self) -> &PrincipalId {
        &self.principal.id
    }

    pub fn entity(&self) -> EntityKind {
        self.principal.entity
    }

    /// Role embedded in the session token (may be stale; see `authorize_current`).
    pub fn role(&self) -> Option<&Role> {
        self.principal.role.as_ref()
    }
}
