//! Team activity entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{ActivityType, TeamActivity};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for activity_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "activity_type", rename_all = "snake_case")]
pub enum ActivityTypeDb {
    TeamCreated,
    MemberAdded,
    MemberRemoved,
    MemberRoleChanged,
    TeamProfileUpdated,
    PresentationCreated,
    PresentationDeleted,
    AssetUploaded,
    AssetDeleted,
}

impl From<ActivityTypeDb> for ActivityType {
    fn from(db: ActivityTypeDb) -> Self {
        match db {
            ActivityTypeDb::TeamCreated => Self::TeamCreated,
            ActivityTypeDb::MemberAdded => Self::MemberAdded,
            ActivityTypeDb::MemberRemoved => Self::MemberRemoved,
            ActivityTypeDb::MemberRoleChanged => Self::MemberRoleChanged,
            ActivityTypeDb::TeamProfileUpdated => Self::TeamProfileUpdated,
            ActivityTypeDb::PresentationCreated => Self::PresentationCreated,
            ActivityTypeDb::PresentationDeleted => Self::PresentationDeleted,
            ActivityTypeDb::AssetUploaded => Self::AssetUploaded,
            ActivityTypeDb::AssetDeleted => Self::AssetDeleted,
        }
    }
}

impl From<ActivityType> for ActivityTypeDb {
    fn from(action: ActivityType) -> Self {
        match action {
            ActivityType::TeamCreated => Self::TeamCreated,
            ActivityType::MemberAdded => Self::MemberAdded,
            ActivityType::MemberRemoved => Self::MemberRemoved,
            ActivityType::MemberRoleChanged => Self::MemberRoleChanged,
            ActivityType::TeamProfileUpdated => Self::TeamProfileUpdated,
            ActivityType::PresentationCreated => Self::PresentationCreated,
            ActivityType::PresentationDeleted => Self::PresentationDeleted,
            ActivityType::AssetUploaded => Self::AssetUploaded,
            ActivityType::AssetDeleted => Self::AssetDeleted,
        }
    }
}

/// Database row mapping for the team_activities table.
#[derive(Debug, Clone, FromRow)]
pub struct TeamActivityEntity {
    pub id: Uuid,
    pub team_id: Uuid,
    pub actor_id: String,
    pub actor_name: String,
    pub action_type: ActivityTypeDb,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub target_name: Option<String>,
    pub details: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl From<TeamActivityEntity> for TeamActivity {
    fn from(entity: TeamActivityEntity) -> Self {
        Self {
            id: entity.id,
            team_id: entity.team_id,
            actor_id: entity.actor_id,
            actor_name: entity.actor_name,
            action_type: entity.action_type.into(),
            target_type: entity.target_type,
            target_id: entity.target_id,
            target_name: entity.target_name,
            details: entity.details,
            created_at: entity.created_at,
        }
    }
}
