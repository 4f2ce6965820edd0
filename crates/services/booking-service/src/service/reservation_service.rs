//! Reservation manager.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{BlockingPolicy, Principal, Reservation, ReservationDraft};

use crate::repository::{ReservationRepository, UserRepository};

/// Reservation service trait for dependency injection.
///
/// Write operations take the acting [`Principal`], whose account must still
/// exist. Non-admin principals may only modify reservations they own.
#[async_trait]
pub trait ReservationService: Send + Sync {
    /// Book a slot for `principal`
    async fn create(&self, principal: &Principal, draft: ReservationDraft)
        -> AppResult<Reservation>;

    /// Replace title, date, times and note; ownership is kept
    async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        draft: ReservationDraft,
    ) -> AppResult<Reservation>;

    /// Delete by ID, `NotFound` if absent
    async fn delete_by_id(&self, principal: &Principal, id: Uuid) -> AppResult<()>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Reservation>>;

    async fn list_all(&self) -> AppResult<Vec<Reservation>>;

    async fn list_all_sorted_by_title(&self) -> AppResult<Vec<Reservation>>;

    async fn list_by_date(&self, date: NaiveDate) -> AppResult<Vec<Reservation>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>>;
}

pub struct ReservationManager {
    users: Arc<dyn UserRepository>,
    reservations: Arc<dyn ReservationRepository>,
    policy: BlockingPolicy,
}

impl ReservationManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        reservations: Arc<dyn ReservationRepository>,
        policy: BlockingPolicy,
    ) -> Self {
        Self {
            users,
            reservations,
            policy,
        }
    }

    /// Sessions outlive account deletion; writes need a live account.
    async fn ensure_account(&self, principal: &Principal) -> AppResult<()> {
        if self.users.find_by_id(principal.user_id).await?.is_none() {
            tracing::warn!(user_id = %principal.user_id, "Write from a deleted account");
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Load a reservation the principal is allowed to modify.
    async fn owned(&self, principal: &Principal, id: Uuid) -> AppResult<Reservation> {
        self.ensure_account(principal).await?;
        let reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !principal.owns_or_admin(reservation.user_id) {
            tracing::warn!(
                user_id = %principal.user_id,
                reservation_id = %id,
                "Rejected change to another user's reservation"
            );
            return Err(AppError::Forbidden);
        }
        Ok(reservation)
    }
}

#[async_trait]
impl ReservationService for ReservationManager {
    async fn create(
        &self,
        principal: &Principal,
        draft: ReservationDraft,
    ) -> AppResult<Reservation> {
        self.ensure_account(principal).await?;
        let reservation = self
            .reservations
            .create(principal.user_id, draft, self.policy)
            .await?;

        tracing::info!(
            reservation_id = %reservation.id,
            user_id = %principal.user_id,
            title = %reservation.title,
            "Created reservation"
        );
        Ok(reservation)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        draft: ReservationDraft,
    ) -> AppResult<Reservation> {
        self.owned(principal, id).await?;
        let reservation = self.reservations.update(id, draft, self.policy).await?;

        tracing::info!(reservation_id = %id, "Updated reservation");
        Ok(reservation)
    }

    async fn delete_by_id(&self, principal: &Principal, id: Uuid) -> AppResult<()> {
        self.owned(principal, id).await?;
        self.reservations.delete(id).await?;

        tracing::info!(reservation_id = %id, "Deleted reservation");
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Reservation>> {
        self.reservations.find_by_user(user_id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Reservation>> {
        self.reservations.list().await
    }

    async fn list_all_sorted_by_title(&self) -> AppResult<Vec<Reservation>> {
        self.reservations.list_sorted_by_title().await
    }

    async fn list_by_date(&self, date: NaiveDate) -> AppResult<Vec<Reservation>> {
        self.reservations.find_by_date(date).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        self.reservations.find_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockReservationRepository, MockUserRepository};
    use chrono::{NaiveTime, Utc};
    use domain::{Role, User, MSG_SLOT_TAKEN};
    use mockall::predicate::eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn principal(roles: &[Role]) -> Principal {
        Principal::new(
            Uuid::new_v4(),
            "jana@x.cz".to_string(),
            "Jana Nová".to_string(),
            roles.iter().copied().collect(),
        )
    }

    fn draft() -> ReservationDraft {
        ReservationDraft::new("Pool", date(), hm(9, 0), hm(10, 0), None).unwrap()
    }

    fn stored(id: Uuid, owner: Uuid, draft: &ReservationDraft) -> Reservation {
        Reservation {
            id,
            title: draft.title().to_string(),
            start_time: draft.start_time(),
            end_time: draft.end_time(),
            reservation_date: draft.reservation_date(),
            note: draft.note().map(str::to_string),
            user_id: owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn account(id: Uuid) -> User {
        User {
            id,
            name: "Jana Nová".to_string(),
            email: "jana@x.cz".to_string(),
            password_hash: "hash".to_string(),
            roles: [Role::User].into_iter().collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn manager(repo: MockReservationRepository) -> ReservationManager {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id))));
        ReservationManager::new(Arc::new(users), Arc::new(repo), BlockingPolicy::Start)
    }

    fn manager_without_accounts(repo: MockReservationRepository) -> ReservationManager {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        ReservationManager::new(Arc::new(users), Arc::new(repo), BlockingPolicy::Start)
    }

    #[tokio::test]
    async fn test_create_attaches_principal_and_policy() {
        let jana = principal(&[Role::User]);
        let owner = jana.user_id;

        let mut repo = MockReservationRepository::new();
        repo.expect_create()
            .with(eq(owner), eq(draft()), eq(BlockingPolicy::Start))
            .times(1)
            .returning(|user_id, draft, _| Ok(stored(Uuid::new_v4(), user_id, &draft)));

        let created = manager(repo).create(&jana, draft()).await.unwrap();

        assert_eq!(created.user_id, owner);
        assert_eq!(created.reservation_date, date());
        assert_eq!(created.start_label(), "09:00");
    }

    #[tokio::test]
    async fn test_create_surfaces_slot_conflict() {
        let mut repo = MockReservationRepository::new();
        repo.expect_create()
            .returning(|_, _, _| Err(AppError::validation(MSG_SLOT_TAKEN)));

        let result = manager(repo).create(&principal(&[Role::User]), draft()).await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == MSG_SLOT_TAKEN));
    }

    #[tokio::test]
    async fn test_deleted_account_cannot_write() {
        let mut repo = MockReservationRepository::new();
        repo.expect_create().never();
        repo.expect_update().never();
        repo.expect_delete().never();
        let stale = principal(&[Role::User]);
        let manager = manager_without_accounts(repo);

        let created = manager.create(&stale, draft()).await;
        let updated = manager.update(&stale, Uuid::new_v4(), draft()).await;
        let deleted = manager.delete_by_id(&stale, Uuid::new_v4()).await;

        assert!(matches!(created, Err(AppError::NotFound)));
        assert!(matches!(updated, Err(AppError::NotFound)));
        assert!(matches!(deleted, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let mut repo = MockReservationRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let result = manager(repo)
            .update(&principal(&[Role::User]), Uuid::new_v4(), draft())
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_foreign_reservation_is_forbidden() {
        let mut repo = MockReservationRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, Uuid::new_v4(), &draft()))));
        repo.expect_update().never();

        let result = manager(repo)
            .update(&principal(&[Role::User]), Uuid::new_v4(), draft())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_admin_updates_any_reservation_keeping_owner() {
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();
        let moved =
            ReservationDraft::new("Sauna", date(), hm(14, 0), hm(15, 30), Some("late".into()))
                .unwrap();

        let mut repo = MockReservationRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(stored(id, owner, &draft()))));
        repo.expect_update()
            .with(eq(id), eq(moved.clone()), eq(BlockingPolicy::Start))
            .times(1)
            .returning(move |id, draft, _| Ok(stored(id, owner, &draft)));

        let updated = manager(repo)
            .update(&principal(&[Role::Admin]), id, moved)
            .await
            .unwrap();

        assert_eq!(updated.user_id, owner);
        assert_eq!(updated.title, "Sauna");
        assert_eq!(updated.end_label(), "15:30");
    }

    #[tokio::test]
    async fn test_delete_nonexistent_fails_with_not_found() {
        let mut repo = MockReservationRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_delete().never();

        let result = manager(repo)
            .delete_by_id(&principal(&[Role::Admin]), Uuid::new_v4())
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_owner_deletes_own_reservation() {
        let jana = principal(&[Role::User]);
        let owner = jana.user_id;
        let id = Uuid::new_v4();

        let mut repo = MockReservationRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(stored(id, owner, &draft()))));
        repo.expect_delete().with(eq(id)).times(1).returning(|_| Ok(()));

        manager(repo).delete_by_id(&jana, id).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_id_absent_is_none() {
        let mut repo = MockReservationRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let found = manager(repo).find_by_id(Uuid::new_v4()).await.unwrap();
        assert!(found.is_none());
    }
}
