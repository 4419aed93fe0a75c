use serde::{Deserialize, Serialize};

use bazaar_core::{EntityKind, PrincipalId};

use crate::Role;

/// Identity of an authenticated caller (a user or a company account).
///
/// The guard produces this from token claims; it is never persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub entity: EntityKind,
    pub role: Option<Role>,
}

impl Principal {
    pub fn new(id: PrincipalId, entity: EntityKind, role: Option<Role>) -> Self {
        Self { id, entity, role }
    }

    pub fn user(id: PrincipalId, role: Option<Role>) -> Self {
        Self::new(id, EntityKind::User, role)
    }

    pub fn company(id: PrincipalId, role: Option<Role>) -> Self {
        Self::new(id, EntityKind::Company, role)
    }

    /// Same account (id and entity), ignoring role.
    pub fn same_identity(&self, other: &Principal) -> bool {
        self.id == other.id && self.entity == other.entity
    }
}
