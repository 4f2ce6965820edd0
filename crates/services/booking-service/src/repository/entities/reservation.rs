//! Reservation database entity for SeaORM.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};

use domain::Reservation;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub start_time: DateTime,
    pub end_time: DateTime,
    /// Derived from `start_time` on every save
    pub reservation_date: Date,
    pub note: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Restrict"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let derived = match &self.start_time {
            ActiveValue::Set(start) | ActiveValue::Unchanged(start) => Some(start.date()),
            ActiveValue::NotSet => None,
        };
        if let Some(date) = derived {
            self.reservation_date = Set(date);
        }
        Ok(self)
    }
}

/// Convert database model to domain entity
impl From<Model> for Reservation {
    fn from(model: Model) -> Self {
        Reservation {
            id: model.id,
            title: model.title,
            start_time: model.start_time,
            end_time: model.end_time,
            reservation_date: model.reservation_date,
            note: model.note,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
