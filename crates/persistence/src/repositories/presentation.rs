//! Presentation repository for the secondary store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{
    ModerationEvent, NewPresentation, Presentation, PresentationFilter, StatusChange,
};
use domain::store::PresentationStore;
use domain::{StoreError, StoreResult};
use shared::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ModerationEventEntity, ModerationStatusDb, PresentationEntity};
use crate::error::map_db_error;
use crate::metrics::QueryTimer;

const PRESENTATION_COLUMNS: &str = "id, title, team_id, owner_id, moderation_status, \
     moderation_notes, moderated_by, moderated_at, deleted, deleted_at, deleted_by, \
     created_at, updated_at";

const EVENT_COLUMNS: &str =
    "id, presentation_id, from_status, to_status, actor_id, notes, created_at";

/// Optional filters shared by the count and page queries. Every condition is
/// disabled when its parameter is NULL or FALSE.
const FILTER_CLAUSE: &str = r#"
    ($1::moderation_status IS NULL OR moderation_status = $1)
    AND ($2::uuid IS NULL OR team_id = $2)
    AND ($3 OR deleted = FALSE)
    AND (NOT $4 OR moderation_status <> 'taken_down')
"#;

/// Repository for presentations and their moderation history.
#[derive(Clone)]
pub struct PresentationRepository {
    pool: PgPool,
}

impl PresentationRepository {
    /// Creates a new PresentationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn set_status_tx(
        &self,
        id: Uuid,
        change: StatusChange,
    ) -> Result<Option<(PresentationEntity, ModerationEventEntity)>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(ModerationStatusDb,)> = sqlx::query_as(
            "SELECT moderation_status FROM presentations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((from_status,)) = current else {
            tx.rollback().await?;
            return Ok(None);
        };
        let to_status = ModerationStatusDb::from(change.status);

        let presentation = sqlx::query_as::<_, PresentationEntity>(&format!(
            r#"
            UPDATE presentations SET
                moderation_status = $2,
                moderation_notes = $3,
                moderated_by = $4,
                moderated_at = $5,
                updated_at = $5
            WHERE id = $1
            RETURNING {PRESENTATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(to_status)
        .bind(&change.notes)
        .bind(&change.actor_id)
        .bind(change.at)
        .fetch_one(&mut *tx)
        .await?;

        let event = sqlx::query_as::<_, ModerationEventEntity>(&format!(
            r#"
            INSERT INTO moderation_events
                (presentation_id, from_status, to_status, actor_id, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from_status)
        .bind(to_status)
        .bind(&change.actor_id)
        .bind(&change.notes)
        .bind(change.at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((presentation, event)))
    }
}

#[async_trait]
impl PresentationStore for PresentationRepository {
    async fn create_presentation(&self, presentation: NewPresentation) -> StoreResult<Presentation> {
        let timer = QueryTimer::new("create_presentation");
        let result = sqlx::query_as::<_, PresentationEntity>(&format!(
            r#"
            INSERT INTO presentations (title, team_id, owner_id)
            VALUES ($1, $2, $3)
            RETURNING {PRESENTATION_COLUMNS}
            "#
        ))
        .bind(&presentation.title)
        .bind(presentation.team_id)
        .bind(&presentation.owner_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.into())
    }

    async fn find_presentation(&self, id: Uuid) -> StoreResult<Option<Presentation>> {
        let timer = QueryTimer::new("find_presentation");
        let result = sqlx::query_as::<_, PresentationEntity>(&format!(
            "SELECT {PRESENTATION_COLUMNS} FROM presentations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.map(Presentation::from))
    }

    async fn list_presentations(
        &self,
        filter: &PresentationFilter,
        page: &PageRequest,
    ) -> StoreResult<(Vec<Presentation>, i64)> {
        let timer = QueryTimer::new("list_presentations");
        let status = filter.status.map(ModerationStatusDb::from);

        let total: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM presentations WHERE {FILTER_CLAUSE}"
        ))
        .bind(status)
        .bind(filter.team_id)
        .bind(filter.include_deleted)
        .bind(filter.exclude_taken_down)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, PresentationEntity>(&format!(
            r#"
            SELECT {PRESENTATION_COLUMNS} FROM presentations
            WHERE {FILTER_CLAUSE}
            ORDER BY created_at DESC, id DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(status)
        .bind(filter.team_id)
        .bind(filter.include_deleted)
        .bind(filter.exclude_taken_down)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        timer.record();
        Ok((rows.into_iter().map(Presentation::from).collect(), total.0))
    }

    async fn set_moderation_status(
        &self,
        id: Uuid,
        change: StatusChange,
    ) -> StoreResult<(Presentation, ModerationEvent)> {
        let timer = QueryTimer::new("set_moderation_status");
        let result = self.set_status_tx(id, change).await;
        timer.record();
        result
            .map_err(map_db_error)?
            .map(|(presentation, event)| (presentation.into(), event.into()))
            .ok_or(StoreError::NotFound)
    }

    async fn mark_deleted(
        &self,
        id: Uuid,
        actor_id: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Presentation>> {
        let timer = QueryTimer::new("soft_delete_presentation");
        let result = sqlx::query_as::<_, PresentationEntity>(&format!(
            r#"
            UPDATE presentations SET
                deleted = TRUE,
                deleted_at = $3,
                deleted_by = $2,
                updated_at = $3
            WHERE id = $1 AND deleted = FALSE
            RETURNING {PRESENTATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(actor_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.map(Presentation::from))
    }

    async fn mark_restored(&self, id: Uuid) -> StoreResult<Option<Presentation>> {
        let timer = QueryTimer::new("restore_presentation");
        let result = sqlx::query_as::<_, PresentationEntity>(&format!(
            r#"
            UPDATE presentations SET
                deleted = FALSE,
                deleted_at = NULL,
                deleted_by = NULL,
                updated_at = NOW()
            WHERE id = $1 AND deleted = TRUE
            RETURNING {PRESENTATION_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.map(Presentation::from))
    }

    async fn purge_presentation(&self, id: Uuid) -> StoreResult<bool> {
        let timer = QueryTimer::new("purge_presentation");
        // Moderation events cascade.
        let result = sqlx::query("DELETE FROM presentations WHERE id = $1 AND deleted = TRUE")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.rows_affected() > 0)
    }

    async fn moderation_history(&self, id: Uuid) -> StoreResult<Vec<ModerationEvent>> {
        let timer = QueryTimer::new("moderation_history");
        let result = sqlx::query_as::<_, ModerationEventEntity>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM moderation_events
            WHERE presentation_id = $1
            ORDER BY created_at, id
            "#
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(map_db_error)?
            .into_iter()
            .map(ModerationEvent::from)
            .collect())
    }

    async fn clear_team_reference(&self, team_id: Uuid) -> StoreResult<u64> {
        let timer = QueryTimer::new("clear_presentation_team_refs");
        let result = sqlx::query(
            "UPDATE presentations SET team_id = NULL, updated_at = NOW() WHERE team_id = $1",
        )
        .bind(team_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.rows_affected())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_db_error)
    }
}
