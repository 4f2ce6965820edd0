//! Migration: at most one reservation per facility, day and start time.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_reservations::Reservations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("uq_reservations_title_date_start")
                    .table(Reservations::Table)
                    .col(Reservations::Title)
                    .col(Reservations::ReservationDate)
                    .col(Reservations::StartTime)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uq_reservations_title_date_start")
                    .table(Reservations::Table)
                    .to_owned(),
            )
            .await
    }
}
