//! User domain entity and related types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Full name stored as "first last"
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// First/last name split on the first space.
    pub fn name_parts(&self) -> (String, String) {
        split_full_name(&self.name)
    }
}

/// Data needed to persist a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    /// Role record ids to link the user to
    pub role_ids: Vec<Uuid>,
}

/// Registration input as submitted by the visitor.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Stored full name: first and last joined by one space.
    pub fn full_name(&self) -> String {
        join_full_name(&self.first_name, &self.last_name)
    }
}

/// Persisted role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRecord {
    pub id: Uuid,
    pub role: Role,
}

/// User projected to the shape shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        let (first_name, last_name) = user.name_parts();
        Self {
            id: user.id,
            first_name,
            last_name,
            email: user.email,
            roles: user.roles.into_iter().collect(),
        }
    }
}

/// Lower-case and trim an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn join_full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_string()
}

/// Split a stored full name on the first space.
///
/// Lossy for multi-part first names: "Anna Marie Nová" yields
/// ("Anna", "Marie Nová").
pub fn split_full_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (name.to_string(), String::new()),
    }
}
