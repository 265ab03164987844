//! Team repository for database operations.
//!
//! Membership rows and the mirrored `users.team_id`/`users.role` columns are
//! always written in the same transaction.

use async_trait::async_trait;
use domain::models::{NewTeam, Role, Team, TeamMember, TeamProfileUpdate, TeamWithMembers};
use domain::store::TeamStore;
use domain::{StoreError, StoreResult};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{TeamEntity, TeamMemberEntity, TeamRoleDb};
use crate::error::map_db_error;
use crate::metrics::QueryTimer;

const TEAM_COLUMNS: &str = "id, name, owner_id, settings, created_at, updated_at";
const MEMBER_COLUMNS: &str = "team_id, user_id, role, joined_at, added_by";

/// Repository for team and membership database operations.
#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Creates a new TeamRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn create_team_tx(&self, team: NewTeam) -> Result<TeamWithMembers, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, TeamEntity>(&format!(
            r#"
            INSERT INTO teams (name, owner_id, settings)
            VALUES ($1, $2, $3)
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(&team.name)
        .bind(&team.owner_id)
        .bind(&team.settings)
        .fetch_one(&mut *tx)
        .await?;

        let owner = sqlx::query_as::<_, TeamMemberEntity>(&format!(
            r#"
            INSERT INTO team_members (team_id, user_id, role)
            VALUES ($1, $2, 'owner')
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(created.id)
        .bind(&team.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        mirror_user(&mut tx, &team.owner_id, Some(created.id), Role::Owner).await?;

        tx.commit().await?;
        Ok(TeamWithMembers {
            team: created.into(),
            members: vec![owner.into()],
        })
    }

    async fn delete_team_tx(&self, id: Uuid) -> Result<Option<TeamEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Reset mirrors before the team row goes, so the guest check holds.
        sqlx::query(
            r#"
            UPDATE users SET team_id = NULL, role = 'guest', updated_at = NOW()
            WHERE team_id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query_as::<_, TeamEntity>(&format!(
            "DELETE FROM teams WHERE id = $1 RETURNING {TEAM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if deleted.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(deleted)
    }

    async fn update_member_role_tx(
        &self,
        team_id: Uuid,
        user_id: &str,
        role: Role,
    ) -> Result<Option<TeamMemberEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let member = sqlx::query_as::<_, TeamMemberEntity>(&format!(
            r#"
            UPDATE team_members SET role = $3
            WHERE team_id = $1 AND user_id = $2
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(team_id)
        .bind(user_id)
        .bind(TeamRoleDb::from(role))
        .fetch_optional(&mut *tx)
        .await?;

        if member.is_some() {
            mirror_user(&mut tx, user_id, Some(team_id), role).await?;
        }

        tx.commit().await?;
        Ok(member)
    }

    async fn remove_member_tx(&self, team_id: Uuid, user_id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if removed {
            mirror_user(&mut tx, user_id, None, Role::Guest).await?;
        }

        tx.commit().await?;
        Ok(removed)
    }

    async fn transfer_ownership_tx(
        &self,
        team_id: Uuid,
        new_owner_id: &str,
    ) -> Result<Option<TeamEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let previous_owner: Option<(String,)> =
            sqlx::query_as("SELECT owner_id FROM teams WHERE id = $1 FOR UPDATE")
                .bind(team_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((previous_owner,)) = previous_owner else {
            tx.rollback().await?;
            return Ok(None);
        };

        let is_member: Option<(String,)> = sqlx::query_as(
            "SELECT user_id FROM team_members WHERE team_id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(team_id)
        .bind(new_owner_id)
        .fetch_optional(&mut *tx)
        .await?;
        if is_member.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        // Demote first: a team may hold only one owner row at a time.
        set_member_role(&mut tx, team_id, &previous_owner, Role::Admin).await?;
        set_member_role(&mut tx, team_id, new_owner_id, Role::Owner).await?;
        mirror_user(&mut tx, &previous_owner, Some(team_id), Role::Admin).await?;
        mirror_user(&mut tx, new_owner_id, Some(team_id), Role::Owner).await?;

        let team = sqlx::query_as::<_, TeamEntity>(&format!(
            r#"
            UPDATE teams SET owner_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(team_id)
        .bind(new_owner_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(team))
    }
}

async fn set_member_role(
    tx: &mut Transaction<'_, Postgres>,
    team_id: Uuid,
    user_id: &str,
    role: Role,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE team_members SET role = $3 WHERE team_id = $1 AND user_id = $2")
        .bind(team_id)
        .bind(user_id)
        .bind(TeamRoleDb::from(role))
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Keep `users.team_id`/`users.role` in step with the membership table.
pub(crate) async fn mirror_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &str,
    team_id: Option<Uuid>,
    role: Role,
) -> Result<(), sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE users SET team_id = $2, role = $3, updated_at = NOW() WHERE id = $1",
    )
    .bind(user_id)
    .bind(team_id)
    .bind(TeamRoleDb::from(role))
    .execute(&mut **tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

#[async_trait]
impl TeamStore for TeamRepository {
    async fn create_team(&self, team: NewTeam) -> StoreResult<TeamWithMembers> {
        let timer = QueryTimer::new("create_team");
        let result = self.create_team_tx(team).await;
        timer.record();
        result.map_err(map_db_error)
    }

    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>> {
        let timer = QueryTimer::new("find_team");
        let result = sqlx::query_as::<_, TeamEntity>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.map(Team::from))
    }

    async fn update_team_profile(&self, id: Uuid, update: TeamProfileUpdate) -> StoreResult<Team> {
        let timer = QueryTimer::new("update_team_profile");
        let result = sqlx::query_as::<_, TeamEntity>(&format!(
            r#"
            UPDATE teams SET
                name = COALESCE($2, name),
                settings = COALESCE($3, settings),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.settings)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
            .map_err(map_db_error)?
            .map(Team::from)
            .ok_or(StoreError::NotFound)
    }

    async fn delete_team(&self, id: Uuid) -> StoreResult<Option<Team>> {
        let timer = QueryTimer::new("delete_team");
        let result = self.delete_team_tx(id).await;
        timer.record();
        Ok(result.map_err(map_db_error)?.map(Team::from))
    }

    async fn list_members(&self, team_id: Uuid) -> StoreResult<Vec<TeamMember>> {
        let timer = QueryTimer::new("list_team_members");
        let result = sqlx::query_as::<_, TeamMemberEntity>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members WHERE team_id = $1 ORDER BY joined_at, user_id"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(map_db_error)?
            .into_iter()
            .map(TeamMember::from)
            .collect())
    }

    async fn find_member(&self, team_id: Uuid, user_id: &str) -> StoreResult<Option<TeamMember>> {
        let timer = QueryTimer::new("find_team_member");
        let result = sqlx::query_as::<_, TeamMemberEntity>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members WHERE team_id = $1 AND user_id = $2"
        ))
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.map(TeamMember::from))
    }

    async fn update_member_role(
        &self,
        team_id: Uuid,
        user_id: &str,
        role: Role,
    ) -> StoreResult<TeamMember> {
        let timer = QueryTimer::new("update_member_role");
        let result = self.update_member_role_tx(team_id, user_id, role).await;
        timer.record();
        result
            .map_err(map_db_error)?
            .map(TeamMember::from)
            .ok_or(StoreError::NotFound)
    }

    async fn remove_member(&self, team_id: Uuid, user_id: &str) -> StoreResult<bool> {
        let timer = QueryTimer::new("remove_team_member");
        let result = self.remove_member_tx(team_id, user_id).await;
        timer.record();
        result.map_err(map_db_error)
    }

    async fn transfer_ownership(&self, team_id: Uuid, new_owner_id: &str) -> StoreResult<Team> {
        let timer = QueryTimer::new("transfer_team_ownership");
        let result = self.transfer_ownership_tx(team_id, new_owner_id).await;
        timer.record();
        result
            .map_err(map_db_error)?
            .map(Team::from)
            .ok_or(StoreError::NotFound)
    }

    async fn count_owned_teams(&self, user_id: &str) -> StoreResult<i64> {
        let timer = QueryTimer::new("count_owned_teams");
        let result: Result<(i64,), sqlx::Error> =
            sqlx::query_as("SELECT COUNT(*) FROM teams WHERE owner_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.0)
    }
}
