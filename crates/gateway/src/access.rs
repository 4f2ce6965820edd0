//! Access control gate.
//!
//! Decides per request path whether the caller passes, must log in first, or
//! is denied, and where a fresh login lands.

use std::fmt;
use std::str::FromStr;

use common::AppError;
use domain::{Principal, Role};

pub const HOME_PATH: &str = "/index";
pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_PATH: &str = "/admin";
pub const RESERVATIONS_PATH: &str = "/reservations";

/// Paths everyone may reach, matched as exact paths or path prefixes.
const PUBLIC_PATHS: &[&str] = &[
    "/index",
    "/login",
    "/logout",
    "/register",
    "/health",
    "/swagger-ui",
    "/api-docs",
];

/// Whether reservation and admin pages are role-gated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessPolicy {
    /// `/reservations` needs `USER`, `/admin` needs `ADMIN`
    #[default]
    RoleGated,
    /// Both areas are reachable without a session
    Open,
}

impl FromStr for AccessPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "role-gated" | "role_gated" | "gated" => Ok(AccessPolicy::RoleGated),
            "open" => Ok(AccessPolicy::Open),
            other => Err(AppError::config(format!(
                "Unknown access policy '{}', expected 'role-gated' or 'open'",
                other
            ))),
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPolicy::RoleGated => write!(f, "role-gated"),
            AccessPolicy::Open => write!(f, "open"),
        }
    }
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    Deny,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGate {
    policy: AccessPolicy,
}

/// `path` equals `prefix` or lies below it.
fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

impl AccessGate {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Role a path demands, if any.
    pub fn required_role(path: &str) -> Option<Role> {
        if under(path, ADMIN_PATH) {
            Some(Role::Admin)
        } else if under(path, RESERVATIONS_PATH) {
            Some(Role::User)
        } else {
            None
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        if path == "/" || PUBLIC_PATHS.iter().any(|public| under(path, public)) {
            return true;
        }
        self.policy == AccessPolicy::Open && Self::required_role(path).is_some()
    }

    pub fn decide(&self, path: &str, principal: Option<&Principal>) -> Decision {
        if self.is_public(path) {
            return Decision::Allow;
        }

        let Some(principal) = principal else {
            return Decision::RedirectToLogin;
        };

        match Self::required_role(path) {
            Some(required) if !principal.can_access(required) => Decision::Deny,
            _ => Decision::Allow,
        }
    }

    /// Where a successful login lands: administrators on the dashboard,
    /// everyone else on their reservations.
    pub fn landing_for(principal: &Principal) -> &'static str {
        if principal.is_admin() {
            ADMIN_PATH
        } else {
            RESERVATIONS_PATH
        }
    }
}
