//! Application state for dependency injection.

use std::sync::Arc;

use auth_service_lib::AuthService;
use booking_service_lib::{HealthCheck, ServiceContainer};

use crate::access::AccessGate;
use crate::config::GatewayConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn ServiceContainer>,
    pub auth: Arc<dyn AuthService>,
    pub health: Arc<dyn HealthCheck>,
    pub gate: AccessGate,
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        auth: Arc<dyn AuthService>,
        health: Arc<dyn HealthCheck>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            services,
            auth,
            health,
            gate: AccessGate::new(config.access_policy),
            config,
        }
    }
}
