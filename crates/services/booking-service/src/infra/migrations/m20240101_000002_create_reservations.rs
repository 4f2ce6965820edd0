//! Migration: reservations owned by users.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_and_roles::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::Title).string().not_null())
                    .col(ColumnDef::new(Reservations::StartTime).timestamp().not_null())
                    .col(ColumnDef::new(Reservations::EndTime).timestamp().not_null())
                    .col(ColumnDef::new(Reservations::ReservationDate).date().not_null())
                    .col(ColumnDef::new(Reservations::Note).text().null())
                    .col(ColumnDef::new(Reservations::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Reservations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_user")
                            .from(Reservations::Table, Reservations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .check(
                        Expr::col(Reservations::StartTime).lt(Expr::col(Reservations::EndTime)),
                    )
                    .to_owned(),
            )
            .await?;

        // Availability lookups filter by day and facility
        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_date_title")
                    .table(Reservations::Table)
                    .col(Reservations::ReservationDate)
                    .col(Reservations::Title)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_user_id")
                    .table(Reservations::Table)
                    .col(Reservations::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Reservations {
    Table,
    Id,
    Title,
    StartTime,
    EndTime,
    ReservationDate,
    Note,
    UserId,
    CreatedAt,
    UpdatedAt,
}
