//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Role, User};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for team_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "team_role", rename_all = "lowercase")]
pub enum TeamRoleDb {
    Owner,
    Admin,
    Editor,
    Viewer,
    Guest,
}

impl From<TeamRoleDb> for Role {
    fn from(db: TeamRoleDb) -> Self {
        match db {
            TeamRoleDb::Owner => Self::Owner,
            TeamRoleDb::Admin => Self::Admin,
            TeamRoleDb::Editor => Self::Editor,
            TeamRoleDb::Viewer => Self::Viewer,
            TeamRoleDb::Guest => Self::Guest,
        }
    }
}

impl From<Role> for TeamRoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Owner => Self::Owner,
            Role::Admin => Self::Admin,
            Role::Editor => Self::Editor,
            Role::Viewer => Self::Viewer,
            Role::Guest => Self::Guest,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub team_id: Option<Uuid>,
    pub role: TeamRoleDb,
    pub is_app_admin: bool,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            display_name: entity.display_name,
            team_id: entity.team_id,
            role: entity.role.into(),
            is_app_admin: entity.is_app_admin,
            disabled: entity.disabled,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
