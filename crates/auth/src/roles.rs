use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for capability checks.
///
/// Roles are opaque, case-sensitive strings. The well-known marketplace tiers
/// are exposed as constants; any other value is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("ADMIN"));
    pub const MODERATOR: Role = Role(Cow::Borrowed("MODERATOR"));
    pub const USER: Role = Role(Cow::Borrowed("USER"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roles allowed to act on moderation reports.
pub const MODERATION_ROLES: [Role; 2] = [Role::ADMIN, Role::MODERATOR];
