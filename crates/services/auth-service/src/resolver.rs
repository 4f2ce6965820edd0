//! Authentication resolver: email to principal plus stored credentials.

use async_trait::async_trait;
use std::sync::Arc;

use booking_service_lib::repository::UserRepository;
use common::{AppError, AppResult};
use domain::{normalize_email, Principal};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A principal together with the hash its password must match.
#[derive(Clone)]
pub struct Credentials {
    pub principal: Principal,
    pub password_hash: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("principal", &self.principal)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Loads credentials by email with the complete authority set.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// `NotFound` when no user has this email.
    async fn resolve(&self, email: &str) -> AppResult<Credentials>;
}

/// [`PrincipalResolver`] backed by the credential store.
pub struct CredentialResolver {
    users: Arc<dyn UserRepository>,
}

impl CredentialResolver {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl PrincipalResolver for CredentialResolver {
    async fn resolve(&self, email: &str) -> AppResult<Credentials> {
        let email = normalize_email(email);
        let user = self.users.find_by_email(&email).await?.ok_or_else(|| {
            tracing::debug!(email = %email, "Principal not found");
            AppError::NotFound
        })?;

        Ok(Credentials {
            principal: Principal::from(&user),
            password_hash: user.password_hash,
        })
    }
}
