//! Account lookup seam.
//!
//! The guard never touches this; login and fresh-role authorization do.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use bazaar_core::{DomainError, EntityKind, PrincipalId};

use crate::password::{hash_password, verify_password};
use crate::{AuthError, Principal, Role};

/// A stored user or company account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub principal: Principal,
    pub email: String,
    pub password_hash: String,
}

/// Read access to user and company accounts.
pub trait AccountStore: Send + Sync {
    fn find(&self, id: &PrincipalId, entity: EntityKind) -> Option<Account>;
    fn find_by_email(&self, entity: EntityKind, email: &str) -> Option<Account>;
}

impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    fn find(&self, id: &PrincipalId, entity: EntityKind) -> Option<Account> {
        (**self).find(id, entity)
    }

    fn find_by_email(&self, entity: EntityKind, email: &str) -> Option<Account> {
        (**self).find_by_email(entity, email)
    }
}

/// Check email/password against the store.
///
/// Unknown account and wrong password are indistinguishable to the caller.
pub fn authenticate(
    store: &dyn AccountStore,
    entity: EntityKind,
    email: &str,
    password: &str,
) -> Result<Principal, AuthError> {
    match store.find_by_email(entity, email) {
        Some(account) if verify_password(&account.password_hash, password) => Ok(account.principal),
        Some(_) => {
            tracing::warn!(%entity, "login rejected: password mismatch");
            Err(AuthError::Unauthenticated)
        }
        None => {
            // Burn the same hashing cost as a real mismatch.
            verify_password(decoy_hash(), password);
            tracing::warn!(%entity, "login rejected: unknown account");
            Err(AuthError::Unauthenticated)
        }
    }
}

/// Hash checked for unknown accounts so lookups cost the same either way.
fn decoy_hash() -> &'static str {
    static DECOY: OnceLock<String> = OnceLock::new();
    DECOY
        .get_or_init(|| hash_password("bazaar-decoy-password").unwrap_or_default())
        .as_str()
}

/// In-memory account store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<HashMap<(EntityKind, PrincipalId), Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new account. Ids are unique per entity kind, and so are
    /// emails (case-insensitive); an existing account is never replaced.
    pub fn insert(&self, account: Account) -> Result<(), DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::validation("account store lock poisoned"))?;

        let entity = account.principal.entity;
        let key = (entity, account.principal.id.clone());
        if map.contains_key(&key) {
            return Err(DomainError::validation(format!(
                "{entity} {} already registered",
                account.principal.id
            )));
        }

        let email_taken = map
            .values()
            .any(|a| a.principal.entity == entity && a.email.eq_ignore_ascii_case(&account.email));
        if email_taken {
            return Err(DomainError::validation(format!(
                "{entity} email already registered"
            )));
        }

        map.insert(key, account);
        Ok(())
    }

    /// Change an account's role (takes effect for fresh-role checks immediately).
    pub fn set_role(
        &self,
        id: &PrincipalId,
        entity: EntityKind,
        role: Option<Role>,
    ) -> Result<(), DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::validation("account store lock poisoned"))?;

        let account = map
            .get_mut(&(entity, id.clone()))
            .ok_or_else(DomainError::not_found)?;
        account.principal.role = role;
        Ok(())
    }

    pub fn remove(&self, id: &PrincipalId, entity: EntityKind) -> Option<Account> {
        self.inner.write().ok()?.remove(&(entity, id.clone()))
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find(&self, id: &PrincipalId, entity: EntityKind) -> Option<Account> {
        let map = self.inner.read().ok()?;
        map.get(&(entity, id.clone())).cloned()
    }

    fn find_by_email(&self, entity: EntityKind, email: &str) -> Option<Account> {
        let map = self.inner.read().ok()?;
        map.values()
            .find(|a| a.principal.entity == entity && a.email.eq_ignore_ascii_case(email))
            .cloned()
    }
}
