//! Role identity and its mapping to stored names and authority tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{AUTHORITY_ADMIN, AUTHORITY_USER, ROLE_NAME_ADMIN, ROLE_NAME_USER};
use crate::error::DomainError;

/// Named permission group attached to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Role assigned to every newly registered user.
    pub const DEFAULT: Role = Role::User;

    /// All known roles.
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    /// Name under which the role is persisted.
    pub fn name(self) -> &'static str {
        match self {
            Role::User => ROLE_NAME_USER,
            Role::Admin => ROLE_NAME_ADMIN,
        }
    }

    /// Authority token consulted by access checks.
    pub fn authority(self) -> &'static str {
        match self {
            Role::User => AUTHORITY_USER,
            Role::Admin => AUTHORITY_ADMIN,
        }
    }

    /// Look up a role by its stored name or authority token.
    pub fn from_name(name: &str) -> Option<Role> {
        let name = name.trim();
        Role::ALL.into_iter().find(|role| {
            role.name().eq_ignore_ascii_case(name) || role.authority().eq_ignore_ascii_case(name)
        })
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Check if this role satisfies a route requiring `required`.
    pub fn can_access(self, required: Role) -> bool {
        match self {
            Role::Admin => true,
            Role::User => required == Role::User,
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_name(s).ok_or_else(|| DomainError::validation(format!("Unknown role: {}", s)))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
