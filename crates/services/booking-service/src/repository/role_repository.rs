//! Role records, created lazily on first reference.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::role::{self, ActiveModel, Entity as RoleEntity};
use super::is_unique_violation;
use common::{AppError, AppResult};
use domain::{Role, RoleRecord};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Find the stored record of a role
    async fn find(&self, role: Role) -> AppResult<Option<RoleRecord>>;

    /// Return the stored record, inserting it first if absent
    async fn find_or_create(&self, role: Role) -> AppResult<RoleRecord>;
}

/// SeaORM implementation of [`RoleRepository`].
pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn find(&self, role: Role) -> AppResult<Option<RoleRecord>> {
        let model = RoleEntity::find()
            .filter(role::Column::Name.eq(role.name()))
            .one(&self.db)
            .await?;

        Ok(model.and_then(|m| m.to_record()))
    }

    async fn find_or_create(&self, role: Role) -> AppResult<RoleRecord> {
        if let Some(record) = self.find(role).await? {
            return Ok(record);
        }

        let inserted = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(role.name().to_string()),
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(model) => {
                tracing::info!(role = %role, "Created role record");
                Ok(RoleRecord { id: model.id, role })
            }
            // Lost the race against a concurrent insert of the same role
            Err(e) if is_unique_violation(&e) => self
                .find(role)
                .await?
                .ok_or_else(|| AppError::internal(format!("Role {} vanished after insert", role))),
            Err(e) => Err(AppError::from(e)),
        }
    }
}
