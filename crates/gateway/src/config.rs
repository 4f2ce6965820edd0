//! Gateway configuration.

use common::{env_or, env_parse, AppResult};

use crate::access::AccessPolicy;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Whether reservation and admin pages need a role
    pub access_policy: AccessPolicy,
    /// Name of the cookie carrying the session token
    pub cookie_name: String,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env_or(&["GATEWAY_HOST", "HOST"], &defaults.host),
            port: env_parse(&["GATEWAY_PORT", "PORT"], defaults.port)?,
            access_policy: env_parse(&["ACCESS_POLICY"], defaults.access_policy)?,
            cookie_name: env_or(&["SESSION_COOKIE_NAME"], &defaults.cookie_name),
            cookie_secure: env_parse(&["SESSION_COOKIE_SECURE"], defaults.cookie_secure)?,
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            access_policy: AccessPolicy::default(),
            cookie_name: "SESSION".to_string(),
            cookie_secure: false,
        }
    }
}
