//! Auth Service Library
//!
//! Resolves principals from the credential store, checks passwords and
//! signs the session tokens carried in the session cookie.

pub mod config;
pub mod resolver;
pub mod service;

use std::sync::Arc;

use booking_service_lib::repository::UserStore;
use sea_orm::DatabaseConnection;

pub use crate::config::AuthServiceConfig;
pub use crate::resolver::{CredentialResolver, Credentials, PrincipalResolver};
pub use crate::service::{AuthService, Authenticator, Claims, Session};

/// Build the authenticator over the credential store.
pub fn authenticator(db: DatabaseConnection, config: &AuthServiceConfig) -> Authenticator {
    let resolver = CredentialResolver::new(Arc::new(UserStore::new(db)));
    Authenticator::new(Arc::new(resolver), config.jwt.clone())
}
