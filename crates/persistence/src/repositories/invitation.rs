//! Invitation repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{NewInvitation, PendingInvitation, TeamMember};
use domain::store::InvitationStore;
use domain::{StoreError, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{InvitationEntity, TeamMemberEntity, TeamRoleDb};
use crate::error::map_db_error;
use crate::metrics::QueryTimer;
use crate::repositories::team::mirror_user;

const INVITATION_COLUMNS: &str = "id, team_id, email, role, invited_by, invited_at";

/// Repository for pending invitation database operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new InvitationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Consume the invitation and create the membership atomically.
    ///
    /// Returns `None` if the invitation no longer exists.
    async fn accept_tx(
        &self,
        id: Uuid,
        user_id: &str,
        joined_at: DateTime<Utc>,
    ) -> Result<Option<TeamMemberEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let invitation = sqlx::query_as::<_, InvitationEntity>(&format!(
            "DELETE FROM invitations WHERE id = $1 RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(invitation) = invitation else {
            tx.rollback().await?;
            return Ok(None);
        };

        let member = sqlx::query_as::<_, TeamMemberEntity>(
            r#"
            INSERT INTO team_members (team_id, user_id, role, joined_at, added_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING team_id, user_id, role, joined_at, added_by
            "#,
        )
        .bind(invitation.team_id)
        .bind(user_id)
        .bind(invitation.role)
        .bind(joined_at)
        .bind(&invitation.invited_by)
        .fetch_one(&mut *tx)
        .await?;

        mirror_user(&mut tx, user_id, Some(invitation.team_id), invitation.role.into()).await?;

        tx.commit().await?;
        Ok(Some(member))
    }
}

#[async_trait]
impl InvitationStore for InvitationRepository {
    async fn create_invitation(&self, invitation: NewInvitation) -> StoreResult<PendingInvitation> {
        let timer = QueryTimer::new("create_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            INSERT INTO invitations (team_id, email, role, invited_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(invitation.team_id)
        .bind(&invitation.email)
        .bind(TeamRoleDb::from(invitation.role))
        .bind(&invitation.invited_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.into())
    }

    async fn find_invitation(&self, id: Uuid) -> StoreResult<Option<PendingInvitation>> {
        let timer = QueryTimer::new("find_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.map(PendingInvitation::from))
    }

    async fn find_invitation_by_email(
        &self,
        team_id: Uuid,
        email: &str,
    ) -> StoreResult<Option<PendingInvitation>> {
        let timer = QueryTimer::new("find_invitation_by_email");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE team_id = $1 AND email = $2"
        ))
        .bind(team_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.map(PendingInvitation::from))
    }

    async fn list_team_invitations(&self, team_id: Uuid) -> StoreResult<Vec<PendingInvitation>> {
        let timer = QueryTimer::new("list_team_invitations");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE team_id = $1 ORDER BY invited_at DESC"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(map_db_error)?
            .into_iter()
            .map(PendingInvitation::from)
            .collect())
    }

    async fn list_invitations_for_email(&self, email: &str) -> StoreResult<Vec<PendingInvitation>> {
        let timer = QueryTimer::new("list_invitations_for_email");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE email = $1 ORDER BY invited_at DESC"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(map_db_error)?
            .into_iter()
            .map(PendingInvitation::from)
            .collect())
    }

    async fn accept_invitation(
        &self,
        id: Uuid,
        user_id: &str,
        joined_at: DateTime<Utc>,
    ) -> StoreResult<TeamMember> {
        let timer = QueryTimer::new("accept_invitation");
        let result = self.accept_tx(id, user_id, joined_at).await;
        timer.record();
        result
            .map_err(map_db_error)?
            .map(TeamMember::from)
            .ok_or(StoreError::NotFound)
    }

    async fn delete_invitation(&self, id: Uuid) -> StoreResult<bool> {
        let timer = QueryTimer::new("delete_invitation");
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.rows_affected() > 0)
    }
}
