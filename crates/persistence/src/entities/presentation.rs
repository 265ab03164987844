//! Presentation and moderation event entities (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{ModerationEvent, ModerationStatus, Presentation};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for moderation_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "moderation_status", rename_all = "snake_case")]
pub enum ModerationStatusDb {
    Active,
    UnderReview,
    TakenDown,
}

impl From<ModerationStatusDb> for ModerationStatus {
    fn from(db: ModerationStatusDb) -> Self {
        match db {
            ModerationStatusDb::Active => Self::Active,
            ModerationStatusDb::UnderReview => Self::UnderReview,
            ModerationStatusDb::TakenDown => Self::TakenDown,
        }
    }
}

impl From<ModerationStatus> for ModerationStatusDb {
    fn from(status: ModerationStatus) -> Self {
        match status {
            ModerationStatus::Active => Self::Active,
            ModerationStatus::UnderReview => Self::UnderReview,
            ModerationStatus::TakenDown => Self::TakenDown,
        }
    }
}

/// Database row mapping for the presentations table.
#[derive(Debug, Clone, FromRow)]
pub struct PresentationEntity {
    pub id: Uuid,
    pub title: String,
    pub team_id: Option<Uuid>,
    pub owner_id: String,
    pub moderation_status: ModerationStatusDb,
    pub moderation_notes: Option<String>,
    pub moderated_by: Option<String>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PresentationEntity> for Presentation {
    fn from(entity: PresentationEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            team_id: entity.team_id,
            owner_id: entity.owner_id,
            moderation_status: entity.moderation_status.into(),
            moderation_notes: entity.moderation_notes,
            moderated_by: entity.moderated_by,
            moderated_at: entity.moderated_at,
            deleted: entity.deleted,
            deleted_at: entity.deleted_at,
            deleted_by: entity.deleted_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the moderation_events table.
#[derive(Debug, Clone, FromRow)]
pub struct ModerationEventEntity {
    pub id: Uuid,
    pub presentation_id: Uuid,
    pub from_status: ModerationStatusDb,
    pub to_status: ModerationStatusDb,
    pub actor_id: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ModerationEventEntity> for ModerationEvent {
    fn from(entity: ModerationEventEntity) -> Self {
        Self {
            id: entity.id,
            presentation_id: entity.presentation_id,
            from_status: entity.from_status.into(),
            to_status: entity.to_status.into(),
            actor_id: entity.actor_id,
            notes: entity.notes,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ModerationStatus::Active,
            ModerationStatus::UnderReview,
            ModerationStatus::TakenDown,
        ] {
            let db: ModerationStatusDb = status.into();
            assert_eq!(ModerationStatus::from(db), status);
        }
    }

    #[test]
    fn test_event_entity_conversion() {
        let entity = ModerationEventEntity {
            id: Uuid::new_v4(),
            presentation_id: Uuid::new_v4(),
            from_status: ModerationStatusDb::Active,
            to_status: ModerationStatusDb::UnderReview,
            actor_id: "admin".to_string(),
            notes: Some("flagged".to_string()),
            created_at: Utc::now(),
        };
        let event: ModerationEvent = entity.into();
        assert_eq!(event.to_status, ModerationStatus::UnderReview);
        assert_eq!(event.notes.as_deref(), Some("flagged"));
    }
}
