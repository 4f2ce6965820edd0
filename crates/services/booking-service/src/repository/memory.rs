//! In-memory store implementing every repository trait, for tests.
//!
//! All tables sit behind one async mutex, so a reservation's conflict check
//! and insert are serialized the same way the advisory lock serializes them
//! in PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ReservationRepository, RoleRepository, UserRepository};
use common::{AppError, AppResult};
use domain::{
    normalize_email, BlockingPolicy, NewUser, Reservation, ReservationDraft, Role, RoleRecord,
    User, MSG_DUPLICATE_EMAIL, MSG_SLOT_TAKEN,
};

struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<UserRow>,
    roles: Vec<RoleRecord>,
    /// (user_id, role_id)
    links: Vec<(Uuid, Uuid)>,
    reservations: Vec<Reservation>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<User> {
        let row = self.users.iter().find(|u| u.id == id)?;
        let roles = self
            .links
            .iter()
            .filter(|(user_id, _)| *user_id == id)
            .filter_map(|(_, role_id)| self.roles.iter().find(|r| r.id == *role_id))
            .map(|r| r.role)
            .collect();

        Some(User {
            id: row.id,
            name: row.name.clone(),
            email: row.email.clone(),
            password_hash: row.password_hash.clone(),
            roles,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn slot_taken(
        &self,
        draft: &ReservationDraft,
        policy: BlockingPolicy,
        except: Option<Uuid>,
    ) -> bool {
        let candidate = (draft.start_time(), draft.end_time());
        self.reservations
            .iter()
            .filter(|r| Some(r.id) != except)
            .filter(|r| r.title == draft.title() && r.reservation_date == draft.reservation_date())
            .any(|r| policy.collides((r.start_time, r.end_time), candidate))
    }

    fn filtered(&self, keep: impl Fn(&Reservation) -> bool) -> Vec<Reservation> {
        let mut rows: Vec<Reservation> =
            self.reservations.iter().filter(|r| keep(r)).cloned().collect();
        rows.sort_by_key(|r| r.start_time);
        rows
    }
}

/// Users, roles and reservations held in process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.lock().await.user(id))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email)
            .and_then(|u| tables.user(u.id)))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let tables = self.tables.lock().await;
        let mut users: Vec<User> = tables.users.iter().filter_map(|u| tables.user(u.id)).collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.email.cmp(&b.email)));
        Ok(users)
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.lock().await;
        let email = normalize_email(&new_user.email);
        if tables.email_taken(&email, None) {
            return Err(AppError::validation(MSG_DUPLICATE_EMAIL));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        tables.users.push(UserRow {
            id,
            name: new_user.name,
            email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        });
        tables
            .links
            .extend(new_user.role_ids.into_iter().map(|role_id| (id, role_id)));

        tables.user(id).ok_or(AppError::NotFound)
    }

    async fn update(&self, id: Uuid, name: String, email: String) -> AppResult<User> {
        let mut tables = self.tables.lock().await;
        let email = normalize_email(&email);
        if tables.email_taken(&email, Some(id)) {
            return Err(AppError::validation(MSG_DUPLICATE_EMAIL));
        }

        let row = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        row.name = name;
        row.email = email;
        row.updated_at = Utc::now();

        tables.user(id).ok_or(AppError::NotFound)
    }

    async fn add_role(&self, id: Uuid, role_id: Uuid) -> AppResult<User> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u.id == id) {
            return Err(AppError::NotFound);
        }
        if !tables.links.contains(&(id, role_id)) {
            tables.links.push((id, role_id));
        }
        tables.user(id).ok_or(AppError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(AppError::NotFound);
        }

        tables.links.retain(|(user_id, _)| *user_id != id);
        tables.reservations.retain(|r| r.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn find(&self, role: Role) -> AppResult<Option<RoleRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables.roles.iter().find(|r| r.role == role).copied())
    }

    async fn find_or_create(&self, role: Role) -> AppResult<RoleRecord> {
        let mut tables = self.tables.lock().await;
        if let Some(record) = tables.roles.iter().find(|r| r.role == role) {
            return Ok(*record);
        }

        let record = RoleRecord {
            id: Uuid::new_v4(),
            role,
        };
        tables.roles.push(record);
        Ok(record)
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        let tables = self.tables.lock().await;
        Ok(tables.reservations.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Reservation>> {
        Ok(self.tables.lock().await.filtered(|_| true))
    }

    async fn list_sorted_by_title(&self) -> AppResult<Vec<Reservation>> {
        let mut rows = self.tables.lock().await.filtered(|_| true);
        rows.sort_by(|a, b| a.title.cmp(&b.title).then(a.start_time.cmp(&b.start_time)));
        Ok(rows)
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<Reservation>> {
        Ok(self.tables.lock().await.filtered(|r| r.user_id == user_id))
    }

    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Vec<Reservation>> {
        Ok(self.tables.lock().await.filtered(|r| r.reservation_date == date))
    }

    async fn find_by_date_and_title(
        &self,
        date: NaiveDate,
        title: String,
    ) -> AppResult<Vec<Reservation>> {
        Ok(self
            .tables
            .lock()
            .await
            .filtered(|r| r.reservation_date == date && r.title == title))
    }

    async fn create(
        &self,
        user_id: Uuid,
        draft: ReservationDraft,
        policy: BlockingPolicy,
    ) -> AppResult<Reservation> {
        let mut tables = self.tables.lock().await;
        // Let competing writers queue up on the lock
        tokio::task::yield_now().await;

        if tables.slot_taken(&draft, policy, None) {
            return Err(AppError::validation(MSG_SLOT_TAKEN));
        }

        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            title: draft.title().to_string(),
            start_time: draft.start_time(),
            end_time: draft.end_time(),
            reservation_date: draft.reservation_date(),
            note: draft.note().map(str::to_string),
            user_id,
            created_at: now,
            updated_at: now,
        };
        tables.reservations.push(reservation.clone());
        Ok(reservation)
    }

    async fn update(
        &self,
        id: Uuid,
        draft: ReservationDraft,
        policy: BlockingPolicy,
    ) -> AppResult<Reservation> {
        let mut tables = self.tables.lock().await;
        if !tables.reservations.iter().any(|r| r.id == id) {
            return Err(AppError::NotFound);
        }
        if tables.slot_taken(&draft, policy, Some(id)) {
            return Err(AppError::validation(MSG_SLOT_TAKEN));
        }

        let row = tables
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::NotFound)?;
        row.title = draft.title().to_string();
        row.start_time = draft.start_time();
        row.end_time = draft.end_time();
        row.reservation_date = draft.reservation_date();
        row.note = draft.note().map(str::to_string);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let before = tables.reservations.len();
        tables.reservations.retain(|r| r.id != id);
        if tables.reservations.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
