//! Booking Service Library
//!
//! Users, roles and reservations over PostgreSQL, plus the slot
//! availability engine. Embedded in-process by the gateway and the
//! combined binary.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use tracing::info;

use common::AppError;
use domain::{Role, User};

pub use crate::config::{BookingServiceConfig, SlotConfig};
pub use crate::infra::{Database, HealthCheck};
pub use crate::service::{
    ReservationManager, ReservationService, ServiceContainer, Services, SlotAvailability,
    SlotService, UserManager, UserService,
};

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = BookingServiceConfig::from_env()?;
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Grant `role` to the account registered under `email` (for CLI commands).
///
/// This is how the first administrator is created.
pub async fn grant_role(email: &str, role: Role) -> Result<User, Box<dyn std::error::Error>> {
    let config = BookingServiceConfig::from_env()?;
    let db = Database::connect(&config.database).await?;
    let services = Services::from_connection(db.get_connection(), &config)?;

    let users = services.users();
    let user = users
        .find_by_email(email)
        .await?
        .ok_or(AppError::NotFound)?;

    let user = users.grant_role(user.id, role).await?;
    info!(email = %user.email, role = %role, "Role granted");
    Ok(user)
}
