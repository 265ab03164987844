//! Team and team membership entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Team, TeamMember};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use super::user::TeamRoleDb;

/// Database row mapping for the teams table.
#[derive(Debug, Clone, FromRow)]
pub struct TeamEntity {
    pub id: Uuid,
    pub name: String,
    pub owner_id: String,
    pub settings: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TeamEntity> for Team {
    fn from(entity: TeamEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            owner_id: entity.owner_id,
            settings: entity.settings,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the team_members table.
#[derive(Debug, Clone, FromRow)]
pub struct TeamMemberEntity {
    pub team_id: Uuid,
    pub user_id: String,
    pub role: TeamRoleDb,
    pub joined_at: DateTime<Utc>,
    pub added_by: Option<String>,
}

impl From<TeamMemberEntity> for TeamMember {
    fn from(entity: TeamMemberEntity) -> Self {
        Self {
            team_id: entity.team_id,
            user_id: entity.user_id,
            role: entity.role.into(),
            joined_at: entity.joined_at,
            added_by: entity.added_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::Role;
    use serde_json::json;

    #[test]
    fn test_team_entity_conversion() {
        let entity = TeamEntity {
            id: Uuid::new_v4(),
            name: "Design Guild".to_string(),
            owner_id: "u1".to_string(),
            settings: json!({"brand_color": "#ff0000"}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let team: Team = entity.clone().into();
        assert_eq!(team.id, entity.id);
        assert_eq!(team.settings["brand_color"], "#ff0000");
    }

    #[test]
    fn test_member_entity_conversion() {
        let entity = TeamMemberEntity {
            team_id: Uuid::new_v4(),
            user_id: "u2".to_string(),
            role: TeamRoleDb::Owner,
            joined_at: Utc::now(),
            added_by: None,
        };
        let member: TeamMember = entity.into();
        assert_eq!(member.role, Role::Owner);
        assert!(member.added_by.is_none());
    }
}
