//! Database migrations.
//!
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_and_roles;
mod m20240101_000002_create_reservations;
mod m20240102_000001_add_reservation_slot_unique;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_and_roles::Migration),
            Box::new(m20240101_000002_create_reservations::Migration),
            Box::new(m20240102_000001_add_reservation_slot_unique::Migration),
        ]
    }
}
