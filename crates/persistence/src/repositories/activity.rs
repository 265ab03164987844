//! Team activity repository for database operations.

use async_trait::async_trait;
use domain::models::{NewActivity, TeamActivity};
use domain::store::ActivityStore;
use domain::StoreResult;
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ActivityTypeDb, TeamActivityEntity};
use crate::error::map_db_error;
use crate::metrics::QueryTimer;

const ACTIVITY_COLUMNS: &str = "id, team_id, actor_id, actor_name, action_type, target_type, \
     target_id, target_name, details, created_at";

/// Repository for the append-only activity log.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Creates a new ActivityRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStore for ActivityRepository {
    async fn append(&self, entry: NewActivity) -> StoreResult<TeamActivity> {
        let timer = QueryTimer::new("append_team_activity");
        let result = sqlx::query_as::<_, TeamActivityEntity>(&format!(
            r#"
            INSERT INTO team_activities
                (team_id, actor_id, actor_name, action_type, target_type, target_id, target_name, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ACTIVITY_COLUMNS}
            "#
        ))
        .bind(entry.team_id)
        .bind(&entry.actor_id)
        .bind(&entry.actor_name)
        .bind(ActivityTypeDb::from(entry.action_type))
        .bind(&entry.target_type)
        .bind(&entry.target_id)
        .bind(&entry.target_name)
        .bind(&entry.details)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.into())
    }

    async fn list_for_team(
        &self,
        team_id: Uuid,
        page: &PageRequest,
    ) -> StoreResult<(Vec<TeamActivity>, i64)> {
        let timer = QueryTimer::new("list_team_activities");

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM team_activities WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, TeamActivityEntity>(&format!(
            r#"
            SELECT {ACTIVITY_COLUMNS} FROM team_activities
            WHERE team_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(team_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        timer.record();
        Ok((rows.into_iter().map(TeamActivity::from).collect(), total.0))
    }
}
