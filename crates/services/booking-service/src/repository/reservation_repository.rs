//! Reservation store with conflict-checked writes.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use super::entities::reservation::{self, ActiveModel, Entity as ReservationEntity};
use super::{finish, is_foreign_key_violation, is_unique_violation};
use common::{AppError, AppResult};
use domain::{BlockingPolicy, Reservation, ReservationDraft, MSG_SLOT_TAKEN};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Reservation repository trait for dependency injection.
///
/// `create` and `update` reject drafts that collide with another
/// reservation of the same facility on the same day under `policy`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>>;

    /// All reservations ordered by start time
    async fn list(&self) -> AppResult<Vec<Reservation>>;

    /// All reservations ordered by title, then start time
    async fn list_sorted_by_title(&self) -> AppResult<Vec<Reservation>>;

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Reservation>>;

    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Vec<Reservation>>;

    async fn find_by_date_and_title(
        &self,
        date: NaiveDate,
        title: String,
    ) -> AppResult<Vec<Reservation>>;

    async fn create(
        &self,
        user_id: Uuid,
        draft: ReservationDraft,
        policy: BlockingPolicy,
    ) -> AppResult<Reservation>;

    /// Replace every field except the owner
    async fn update(
        &self,
        id: Uuid,
        draft: ReservationDraft,
        policy: BlockingPolicy,
    ) -> AppResult<Reservation>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM implementation of [`ReservationRepository`].
pub struct ReservationStore {
    db: DatabaseConnection,
}

impl ReservationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Serialize writers of one facility-day until the transaction ends.
    async fn lock_facility_day<C: ConnectionTrait>(
        conn: &C,
        draft: &ReservationDraft,
    ) -> AppResult<()> {
        let key = format!(
            "{}|{}",
            draft.title().to_lowercase(),
            draft.reservation_date()
        );
        conn.execute(Statement::from_sql_and_values(
            conn.get_database_backend(),
            "SELECT pg_advisory_xact_lock(hashtext($1))",
            [key.into()],
        ))
        .await?;
        Ok(())
    }

    async fn ensure_free<C: ConnectionTrait>(
        conn: &C,
        draft: &ReservationDraft,
        policy: BlockingPolicy,
        exclude: Option<Uuid>,
    ) -> AppResult<()> {
        let mut query = ReservationEntity::find()
            .filter(reservation::Column::ReservationDate.eq(draft.reservation_date()))
            .filter(reservation::Column::Title.eq(draft.title()));
        if let Some(id) = exclude {
            query = query.filter(reservation::Column::Id.ne(id));
        }

        let candidate = (draft.start_time(), draft.end_time());
        let taken = query
            .all(conn)
            .await?
            .iter()
            .any(|existing| policy.collides((existing.start_time, existing.end_time), candidate));

        if taken {
            tracing::debug!(
                title = draft.title(),
                start = %draft.start_time(),
                "Rejected colliding reservation"
            );
            return Err(AppError::validation(MSG_SLOT_TAKEN));
        }
        Ok(())
    }
}

fn map_slot_conflict(err: DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::validation(MSG_SLOT_TAKEN)
    } else if is_foreign_key_violation(&err) {
        // owner deleted after the account check
        AppError::NotFound
    } else {
        AppError::from(err)
    }
}

fn collect(models: Vec<reservation::Model>) -> Vec<Reservation> {
    models.into_iter().map(Reservation::from).collect()
}

#[async_trait]
impl ReservationRepository for ReservationStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        let model = ReservationEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Reservation::from))
    }

    async fn list(&self) -> AppResult<Vec<Reservation>> {
        let models = ReservationEntity::find()
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await?;
        Ok(collect(models))
    }

    async fn list_sorted_by_title(&self) -> AppResult<Vec<Reservation>> {
        let models = ReservationEntity::find()
            .order_by_asc(reservation::Column::Title)
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await?;
        Ok(collect(models))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Reservation>> {
        let models = ReservationEntity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await?;
        Ok(collect(models))
    }

    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Vec<Reservation>> {
        let models = ReservationEntity::find()
            .filter(reservation::Column::ReservationDate.eq(date))
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await?;
        Ok(collect(models))
    }

    async fn find_by_date_and_title(
        &self,
        date: NaiveDate,
        title: String,
    ) -> AppResult<Vec<Reservation>> {
        let models = ReservationEntity::find()
            .filter(reservation::Column::ReservationDate.eq(date))
            .filter(reservation::Column::Title.eq(title))
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await?;
        Ok(collect(models))
    }

    async fn create(
        &self,
        user_id: Uuid,
        draft: ReservationDraft,
        policy: BlockingPolicy,
    ) -> AppResult<Reservation> {
        let txn = self.db.begin().await?;
        let conn = &txn;

        let result: AppResult<Reservation> = async move {
            Self::lock_facility_day(conn, &draft).await?;
            Self::ensure_free(conn, &draft, policy, None).await?;

            let now = chrono::Utc::now();
            let model = ActiveModel {
                id: Set(Uuid::new_v4()),
                title: Set(draft.title().to_string()),
                start_time: Set(draft.start_time()),
                end_time: Set(draft.end_time()),
                note: Set(draft.note().map(str::to_string)),
                user_id: Set(user_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(map_slot_conflict)?;

            Ok(Reservation::from(model))
        }
        .await;

        finish(txn, result).await
    }

    async fn update(
        &self,
        id: Uuid,
        draft: ReservationDraft,
        policy: BlockingPolicy,
    ) -> AppResult<Reservation> {
        let txn = self.db.begin().await?;
        let conn = &txn;

        let result: AppResult<Reservation> = async move {
            let existing = ReservationEntity::find_by_id(id)
                .one(conn)
                .await?
                .ok_or(AppError::NotFound)?;

            Self::lock_facility_day(conn, &draft).await?;
            Self::ensure_free(conn, &draft, policy, Some(id)).await?;

            let mut active: ActiveModel = existing.into();
            active.title = Set(draft.title().to_string());
            active.start_time = Set(draft.start_time());
            active.end_time = Set(draft.end_time());
            active.note = Set(draft.note().map(str::to_string));
            active.updated_at = Set(chrono::Utc::now());

            let model = active.update(conn).await.map_err(map_slot_conflict)?;
            Ok(Reservation::from(model))
        }
        .await;

        finish(txn, result).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ReservationEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
