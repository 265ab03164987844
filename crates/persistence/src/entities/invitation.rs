//! Pending invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::PendingInvitation;
use sqlx::FromRow;
use uuid::Uuid;

use super::user::TeamRoleDb;

/// Database row mapping for the invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub team_id: Uuid,
    pub email: String,
    pub role: TeamRoleDb,
    pub invited_by: String,
    pub invited_at: DateTime<Utc>,
}

impl From<InvitationEntity> for PendingInvitation {
    fn from(entity: InvitationEntity) -> Self {
        Self {
            id: entity.id,
            team_id: entity.team_id,
            email: entity.email,
            role: entity.role.into(),
            invited_by: entity.invited_by,
            invited_at: entity.invited_at,
        }
    }
}
