//! Request-scoped identity.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;
use crate::user::User;

/// Resolved identity and authority set for the current session.
///
/// Built once at login and carried in the session token; managers receive
/// it explicitly instead of reading any global session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: BTreeSet<Role>,
}

impl Principal {
    pub fn new(user_id: Uuid, email: String, name: String, roles: BTreeSet<Role>) -> Self {
        Self {
            user_id,
            email,
            name,
            roles,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Administrator membership test.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Check whether any held role satisfies `required`.
    pub fn can_access(&self, required: Role) -> bool {
        self.roles.iter().any(|role| role.can_access(required))
    }

    /// Authority tokens in a stable order.
    pub fn authorities(&self) -> Vec<&'static str> {
        self.roles.iter().map(|role| role.authority()).collect()
    }

    /// Whether this principal may modify a record owned by `owner`.
    pub fn owns_or_admin(&self, owner: Uuid) -> bool {
        self.user_id == owner || self.is_admin()
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            roles: user.roles.clone(),
        }
    }
}
