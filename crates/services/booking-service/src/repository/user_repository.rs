//! Credential store: users and their role links.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IsolationLevel, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::reservation::{self, Entity as ReservationEntity};
use super::entities::role::Entity as RoleEntity;
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::entities::user_role::{self, Entity as UserRoleEntity};
use super::{finish, is_unique_violation};
use common::{AppError, AppResult};
use domain::{normalize_email, NewUser, User, MSG_DUPLICATE_EMAIL};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Every returned [`User`] carries its complete role set. Email lookups are
/// case-insensitive.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List all users ordered by name
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Insert a user and link it to `new_user.role_ids`
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Replace name and email
    async fn update(&self, id: Uuid, name: String, email: String) -> AppResult<User>;

    /// Link an existing role record to the user (no-op if already linked)
    async fn add_role(&self, id: Uuid, role_id: Uuid) -> AppResult<User>;

    /// Delete the user together with their reservations and role links
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM implementation of [`UserRepository`].
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .find_with_related(RoleEntity)
            .all(conn)
            .await?;

        Ok(found.into_iter().next().map(user::into_user))
    }
}

fn map_email_conflict(err: sea_orm::DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::validation(MSG_DUPLICATE_EMAIL)
    } else {
        AppError::from(err)
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Self::load(&self.db, id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let found = UserEntity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .find_with_related(RoleEntity)
            .all(&self.db)
            .await?;

        Ok(found.into_iter().next().map(user::into_user))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let rows = UserEntity::find()
            .find_with_related(RoleEntity)
            .all(&self.db)
            .await?;

        let mut users: Vec<User> = rows.into_iter().map(user::into_user).collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.email.cmp(&b.email)));
        Ok(users)
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = chrono::Utc::now();
        let id = Uuid::new_v4();

        let txn = self.db.begin().await?;
        let conn = &txn;
        let result: AppResult<User> = async move {
            ActiveModel {
                id: Set(id),
                name: Set(new_user.name),
                email: Set(normalize_email(&new_user.email)),
                password_hash: Set(new_user.password_hash),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn)
            .await
            .map_err(map_email_conflict)?;

            for role_id in new_user.role_ids {
                user_role::ActiveModel {
                    user_id: Set(id),
                    role_id: Set(role_id),
                }
                .insert(conn)
                .await?;
            }

            Self::load(conn, id).await?.ok_or_else(|| {
                AppError::internal("User disappeared inside its creating transaction")
            })
        }
        .await;

        finish(txn, result).await
    }

    async fn update(&self, id: Uuid, name: String, email: String) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = model.into();
        active.name = Set(name);
        active.email = Set(normalize_email(&email));
        active.updated_at = Set(chrono::Utc::now());
        active.update(&self.db).await.map_err(map_email_conflict)?;

        Self::load(&self.db, id).await?.ok_or(AppError::NotFound)
    }

    async fn add_role(&self, id: Uuid, role_id: Uuid) -> AppResult<User> {
        let user = Self::load(&self.db, id).await?.ok_or(AppError::NotFound)?;

        let linked = UserRoleEntity::find_by_id((id, role_id))
            .one(&self.db)
            .await?
            .is_some();
        if linked {
            return Ok(user);
        }

        user_role::ActiveModel {
            user_id: Set(id),
            role_id: Set(role_id),
        }
        .insert(&self.db)
        .await?;

        Self::load(&self.db, id).await?.ok_or(AppError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await?;

        let conn = &txn;
        let result: AppResult<()> = async move {
            let removed = ReservationEntity::delete_many()
                .filter(reservation::Column::UserId.eq(id))
                .exec(conn)
                .await?;

            UserRoleEntity::delete_many()
                .filter(user_role::Column::UserId.eq(id))
                .exec(conn)
                .await?;

            let deleted = UserEntity::delete_by_id(id).exec(conn).await?;
            if deleted.rows_affected == 0 {
                return Err(AppError::NotFound);
            }

            tracing::info!(
                user_id = %id,
                reservations = removed.rows_affected,
                "Deleted user and owned reservations"
            );
            Ok(())
        }
        .await;

        finish(txn, result).await
    }
}
