//! Authentication service - credential checks and session tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use async_trait::async_trait;
use common::{AppError, AppResult, JwtConfig};
use domain::{Password, Principal, Role, SECONDS_PER_HOUR};

use crate::resolver::PrincipalResolver;

/// Verified against when the email is unknown, so a miss costs as much as a
/// wrong password.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    Password::new("timing-equalizer")
        .map(Password::into_string)
        .unwrap_or_default()
});

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    /// Authority tokens, e.g. `ROLE_USER`
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    fn into_principal(self) -> Principal {
        let roles = self
            .roles
            .iter()
            .filter_map(|authority| Role::from_name(authority))
            .collect();
        Principal::new(self.sub, self.email, self.name, roles)
    }
}

/// Established session returned after successful authentication
#[derive(Debug, Clone)]
pub struct Session {
    /// Signed session token
    pub token: String,
    pub principal: Principal,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and open a session
    async fn login(&self, email: &str, password: &str) -> AppResult<Session>;

    /// Sign a session token for an already resolved principal
    fn issue(&self, principal: Principal) -> AppResult<Session>;

    /// Verify a session token and rebuild its principal
    fn verify_token(&self, token: &str) -> AppResult<Principal>;
}

/// Concrete implementation of [`AuthService`].
pub struct Authenticator {
    resolver: Arc<dyn PrincipalResolver>,
    jwt: JwtConfig,
}

impl Authenticator {
    pub fn new(resolver: Arc<dyn PrincipalResolver>, jwt: JwtConfig) -> Self {
        Self { resolver, jwt }
    }

    fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt.secret.as_bytes()
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let credentials = match self.resolver.resolve(email).await {
            Ok(credentials) => Some(credentials),
            Err(AppError::NotFound) => None,
            Err(e) => return Err(e),
        };

        let hash = credentials
            .as_ref()
            .map(|c| c.password_hash.as_str())
            .unwrap_or(DUMMY_HASH.as_str());
        let password_valid = Password::from_hash(hash).verify(password);

        match credentials {
            Some(credentials) if password_valid => {
                tracing::info!(user_id = %credentials.principal.user_id, "Login succeeded");
                self.issue(credentials.principal)
            }
            _ => {
                tracing::debug!("Login rejected");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    fn issue(&self, principal: Principal) -> AppResult<Session> {
        let now = Utc::now();
        let expires_at = Duration::try_hours(self.jwt.expiration_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| AppError::internal("Session lifetime out of range"))?;
        let expires_in = self
            .jwt
            .expiration_hours
            .checked_mul(SECONDS_PER_HOUR)
            .ok_or_else(|| AppError::internal("Session lifetime out of range"))?;

        let claims = Claims {
            sub: principal.user_id,
            email: principal.email.clone(),
            name: principal.name.clone(),
            roles: principal
                .authorities()
                .into_iter()
                .map(str::to_string)
                .collect(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret_bytes()),
        )?;

        Ok(Session {
            token,
            principal,
            expires_in,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Principal> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims.into_principal())
    }
}
