//! User database entity for SeaORM.

use std::collections::BTreeSet;

use sea_orm::entity::prelude::*;

use domain::{Role, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Stored lower-cased
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRole,
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservation,
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_role::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_role::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert a user row and its eagerly loaded roles to the domain entity.
///
/// Role rows with names the application does not know are skipped.
pub fn into_user((model, role_models): (Model, Vec<super::role::Model>)) -> User {
    let roles: BTreeSet<Role> = role_models
        .into_iter()
        .filter_map(|r| {
            let role = Role::from_name(&r.name);
            if role.is_none() {
                tracing::warn!(user_id = %model.id, role = %r.name, "Skipping unknown role");
            }
            role
        })
        .collect();

    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        roles,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row() -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            name: "Jana".to_string(),
            email: "jana@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn role_row(name: &str) -> super::super::role::Model {
        super::super::role::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_into_user_keeps_known_roles() {
        let model = row();
        let id = model.id;

        let user = into_user((model, vec![role_row("ADMIN"), role_row("ROLE_USER")]));

        assert_eq!(user.id, id);
        assert_eq!(user.email, "jana@example.com");
        assert!(user.roles.contains(&Role::Admin));
        assert!(user.roles.contains(&Role::User));
    }

    #[test]
    fn test_into_user_skips_unknown_roles() {
        let user = into_user((row(), vec![role_row("AUDITOR"), role_row("USER")]));

        assert_eq!(user.roles.len(), 1);
        assert!(user.roles.contains(&Role::User));
    }
}
