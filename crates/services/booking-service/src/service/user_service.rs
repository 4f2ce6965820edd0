//! User manager - registration and administrative user maintenance.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{
    normalize_email, NewUser, Password, Registration, Role, User, UserProfile,
    MSG_DUPLICATE_EMAIL,
};

use crate::repository::{RoleRepository, UserRepository};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create an account with the default role
    async fn register(&self, registration: Registration) -> AppResult<User>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Get user by ID, `NotFound` if absent
    async fn find_by_id(&self, id: Uuid) -> AppResult<User>;

    /// All users in display shape
    async fn list_all(&self) -> AppResult<Vec<UserProfile>>;

    /// Change name and email only
    async fn update(&self, id: Uuid, name: String, email: String) -> AppResult<User>;

    /// Delete the user and everything they own
    async fn delete_by_id(&self, id: Uuid) -> AppResult<()>;

    /// Attach `role` to the user, creating the role record if needed
    async fn grant_role(&self, id: Uuid, role: Role) -> AppResult<User>;
}

/// Concrete implementation of [`UserService`] over the credential store.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { users, roles }
    }

    fn require_email(email: &str) -> AppResult<String> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::validation("Email is required."));
        }
        Ok(email)
    }

    fn require_name(name: &str) -> AppResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name is required."));
        }
        Ok(name.to_string())
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        let email = Self::require_email(&registration.email)?;
        let name = Self::require_name(&registration.full_name())?;

        if self.users.find_by_email(&email).await?.is_some() {
            tracing::debug!(email = %email, "Registration rejected: duplicate email");
            return Err(AppError::validation(MSG_DUPLICATE_EMAIL));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let role = self.roles.find_or_create(Role::DEFAULT).await?;

        let user = self
            .users
            .create(NewUser {
                name,
                email,
                password_hash,
                role_ids: vec![role.id],
            })
            .await?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(&normalize_email(email)).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn list_all(&self) -> AppResult<Vec<UserProfile>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    async fn update(&self, id: Uuid, name: String, email: String) -> AppResult<User> {
        let name = Self::require_name(&name)?;
        let email = Self::require_email(&email)?;

        if let Some(owner) = self.users.find_by_email(&email).await? {
            if owner.id != id {
                return Err(AppError::validation(MSG_DUPLICATE_EMAIL));
            }
        }

        self.users.update(id, name, email).await
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<()> {
        self.users.delete(id).await
    }

    async fn grant_role(&self, id: Uuid, role: Role) -> AppResult<User> {
        let record = self.roles.find_or_create(role).await?;
        let user = self.users.add_role(id, record.id).await?;

        tracing::info!(user_id = %id, role = %role, "Granted role");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockRoleRepository, MockUserRepository};
    use chrono::Utc;
    use domain::RoleRecord;
    use mockall::predicate::eq;

    fn user(id: Uuid, email: &str, roles: &[Role]) -> User {
        User {
            id,
            name: "Jana Nová".to_string(),
            email: email.to_string(),
            password_hash: "hashed".to_string(),
            roles: roles.iter().copied().collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn registration(email: &str) -> Registration {
        Registration {
            first_name: "Jana".to_string(),
            last_name: "Nová".to_string(),
            email: email.to_string(),
            password: "pw1".to_string(),
        }
    }

    fn manager(users: MockUserRepository, roles: MockRoleRepository) -> UserManager {
        UserManager::new(Arc::new(users), Arc::new(roles))
    }

    #[tokio::test]
    async fn test_register_assigns_default_role_and_hashes_password() {
        let role_id = Uuid::new_v4();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("jana@x.cz"))
            .times(1)
            .returning(|_| Ok(None));
        users
            .expect_create()
            .withf(move |new_user| {
                new_user.name == "Jana Nová"
                    && new_user.email == "jana@x.cz"
                    && new_user.role_ids == vec![role_id]
                    && Password::from_hash(new_user.password_hash.clone()).verify("pw1")
            })
            .times(1)
            .returning(|new_user| {
                let mut created = user(Uuid::new_v4(), &new_user.email, &[Role::User]);
                created.name = new_user.name;
                Ok(created)
            });

        let mut roles = MockRoleRepository::new();
        roles
            .expect_find_or_create()
            .with(eq(Role::User))
            .times(1)
            .returning(move |role| Ok(RoleRecord { id: role_id, role }));

        let created = manager(users, roles)
            .register(registration(" Jana@X.cz "))
            .await
            .unwrap();

        assert_eq!(created.roles.len(), 1);
        assert!(created.has_role(Role::User));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_validation_failure() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|email| Ok(Some(user(Uuid::new_v4(), email, &[Role::User]))));
        users.expect_create().never();

        let mut roles = MockRoleRepository::new();
        roles.expect_find_or_create().never();

        let result = manager(users, roles)
            .register(registration("jana@x.cz"))
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == MSG_DUPLICATE_EMAIL));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_create().never();

        let mut reg = registration("jana@x.cz");
        reg.password = String::new();

        let result = manager(users, MockRoleRepository::new()).register(reg).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let result = manager(users, MockRoleRepository::new())
            .find_by_id(Uuid::new_v4())
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_all_splits_names() {
        let mut users = MockUserRepository::new();
        users.expect_list().returning(|| {
            let mut second = user(Uuid::new_v4(), "anna@x.cz", &[Role::Admin]);
            second.name = "Anna Marie Dvořák".to_string();
            Ok(vec![user(Uuid::new_v4(), "jana@x.cz", &[Role::User]), second])
        });

        let profiles = manager(users, MockRoleRepository::new())
            .list_all()
            .await
            .unwrap();

        assert_eq!(profiles[0].first_name, "Jana");
        assert_eq!(profiles[0].last_name, "Nová");
        assert_eq!(profiles[1].first_name, "Anna");
        assert_eq!(profiles[1].last_name, "Marie Dvořák");
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_another_user() {
        let id = Uuid::new_v4();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|email| Ok(Some(user(Uuid::new_v4(), email, &[Role::User]))));
        users.expect_update().never();

        let result = manager(users, MockRoleRepository::new())
            .update(id, "Jana Nová".to_string(), "taken@x.cz".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_own_email() {
        let id = Uuid::new_v4();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |email| Ok(Some(user(id, email, &[Role::User]))));
        users
            .expect_update()
            .with(eq(id), eq("Jana Dvořák".to_string()), eq("jana@x.cz".to_string()))
            .times(1)
            .returning(|id, name, email| {
                let mut updated = user(id, &email, &[Role::User]);
                updated.name = name;
                Ok(updated)
            });

        let updated = manager(users, MockRoleRepository::new())
            .update(id, " Jana Dvořák ".to_string(), "JANA@x.cz".to_string())
            .await
            .unwrap();

        assert_eq!(updated.name, "Jana Dvořák");
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_update()
            .returning(|_, _, _| Err(AppError::NotFound));

        let result = manager(users, MockRoleRepository::new())
            .update(Uuid::new_v4(), "Jana".to_string(), "jana@x.cz".to_string())
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_propagates_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_delete().returning(|_| Err(AppError::NotFound));

        let result = manager(users, MockRoleRepository::new())
            .delete_by_id(Uuid::new_v4())
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_grant_role_creates_role_lazily() {
        let id = Uuid::new_v4();
        let role_id = Uuid::new_v4();

        let mut roles = MockRoleRepository::new();
        roles
            .expect_find_or_create()
            .with(eq(Role::Admin))
            .times(1)
            .returning(move |role| Ok(RoleRecord { id: role_id, role }));

        let mut users = MockUserRepository::new();
        users
            .expect_add_role()
            .with(eq(id), eq(role_id))
            .times(1)
            .returning(|id, _| Ok(user(id, "jana@x.cz", &[Role::User, Role::Admin])));

        let updated = manager(users, roles).grant_role(id, Role::Admin).await.unwrap();
        assert!(updated.is_admin());
    }
}
