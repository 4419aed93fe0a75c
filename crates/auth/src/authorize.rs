//! Role and ownership checks.
//!
//! - No IO (except [`authorize_current`], which reads through the injected store)
//! - No panics

use bazaar_core::{EntityKind, PrincipalId};

use crate::store::AccountStore;
use crate::{AuthError, Principal, Role};

/// Authorize a principal against a set of allowed roles.
///
/// Exact, case-sensitive match; a principal without a role is never allowed.
pub fn authorize(principal: &Principal, allowed: &[Role]) -> Result<(), AuthError> {
    match &principal.role {
        Some(role) if allowed.contains(role) => Ok(()),
        Some(role) => Err(AuthError::forbidden(format!("role '{role}' is not permitted"))),
        None => Err(AuthError::forbidden("no role assigned")),
    }
}

/// Authorize against the role currently stored for the principal's account.
///
/// The token's embedded role is ignored; a deleted account is treated as
/// unauthenticated. Returns the principal as currently stored.
pub fn authorize_current(
    store: &dyn AccountStore,
    principal: &Principal,
    allowed: &[Role],
) -> Result<Principal, AuthError> {
    let account = store
        .find(&principal.id, principal.entity)
        .ok_or(AuthError::Unauthenticated)?;

    if account.principal.role != principal.role {
        tracing::info!(
            principal_id = %principal.id,
            entity = %principal.entity,
            token_role = ?principal.role,
            current_role = ?account.principal.role,
            "role changed since session was issued"
        );
    }

    authorize(&account.principal, allowed)?;
    Ok(account.principal)
}

/// Whether `principal` is the owner identified by `(owner_id, owner_entity)`.
pub fn is_owner(principal: &Principal, owner_id: &PrincipalId, owner_entity: EntityKind) -> bool {
    principal.id == *owner_id && principal.entity == owner_entity
}

/// Ownership check for per-resource actions (e.g. toggling an offer).
pub fn ensure_owner(
    principal: &Principal,
    owner_id: &PrincipalId,
    owner_entity: EntityKind,
) -> Result<(), AuthError> {
    if is_owner(principal, owner_id, owner_entity) {
        Ok(())
    } else {
        Err(AuthError::forbidden("not the owner of this resource"))
    }
}
