//! Gateway Library
//!
//! The HTTP surface of the booking app: session cookie handling, the access
//! gate, the page handlers and the OpenAPI document. The booking and auth
//! services are embedded in-process.

pub mod access;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use auth_service_lib::AuthServiceConfig;
use booking_service_lib::{BookingServiceConfig, Database, Services};
use common::AppResult;

pub use crate::access::{AccessGate, AccessPolicy};
pub use crate::config::GatewayConfig;
pub use crate::openapi::ApiDoc;
pub use crate::routes::create_router;
pub use crate::state::AppState;

/// Wire the managers and the authenticator over one connection pool.
pub fn build_state(
    db: Database,
    booking: &BookingServiceConfig,
    auth: &AuthServiceConfig,
    config: GatewayConfig,
) -> AppResult<AppState> {
    let services = Services::from_connection(db.get_connection(), booking)?;
    let authenticator = auth_service_lib::authenticator(db.get_connection(), auth);

    Ok(AppState::new(
        Arc::new(services),
        Arc::new(authenticator),
        Arc::new(db),
        config,
    ))
}

/// Run the HTTP server until ctrl-c.
pub async fn serve(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port).parse()?;
    info!(policy = %state.config.access_policy, "Access policy");

    let app = create_router(state).layer(TraceLayer::new_for_http());

    info!("Gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

/// Load configuration from the environment, connect and serve (for combined binary).
///
/// `host` and `port` override the environment when given.
pub async fn run_embedded(
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let booking = BookingServiceConfig::from_env()?;
    let auth = AuthServiceConfig::from_env()?;
    let mut config = GatewayConfig::from_env()?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let db = Database::connect(&booking.database).await?;
    let state = build_state(db, &booking, &auth, config)?;

    serve(state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
