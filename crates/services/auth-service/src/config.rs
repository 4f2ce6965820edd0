//! Auth service configuration.

use common::{env_first, env_parse, AppError, AppResult, JwtConfig};
use domain::{
    DEFAULT_SESSION_EXPIRATION_HOURS, MAX_SESSION_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH,
};

/// Auth service configuration.
#[derive(Debug, Clone, Default)]
pub struct AuthServiceConfig {
    pub jwt: JwtConfig,
}

impl AuthServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// `JWT_SECRET` is required and must be at least
    /// [`MIN_JWT_SECRET_LENGTH`] characters.
    pub fn from_env() -> AppResult<Self> {
        let secret = env_first(&["JWT_SECRET", "AUTH_SERVICE_JWT_SECRET"])
            .ok_or_else(|| AppError::config("JWT_SECRET must be set"))?;
        let expiration_hours = env_parse(
            &["SESSION_EXPIRATION_HOURS", "JWT_EXPIRATION_HOURS"],
            DEFAULT_SESSION_EXPIRATION_HOURS,
        )?;

        Self::new(secret, expiration_hours)
    }

    pub fn new(secret: String, expiration_hours: i64) -> AppResult<Self> {
        if secret.chars().count() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::config(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_JWT_SECRET_LENGTH
            )));
        }
        if expiration_hours <= 0 {
            return Err(AppError::config("SESSION_EXPIRATION_HOURS must be positive"));
        }
        if expiration_hours > MAX_SESSION_EXPIRATION_HOURS {
            return Err(AppError::config(format!(
                "SESSION_EXPIRATION_HOURS must not exceed {}",
                MAX_SESSION_EXPIRATION_HOURS
            )));
        }

        Ok(Self {
            jwt: JwtConfig {
                secret,
                expiration_hours,
            },
        })
    }
}
