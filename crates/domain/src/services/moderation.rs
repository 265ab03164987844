//! Presentation moderation state machine.
//!
//! Two independent axes:
//! - moderation status: any admin may move between `active`, `under_review`
//!   and `taken_down` in any direction; every change is recorded.
//! - deletion: not-deleted -> soft-deleted (reversible via restore) ->
//!   permanently deleted. Permanent deletion requires a prior soft-delete.

use std::sync::Arc;

use chrono::Utc;
use shared::pagination::{PageRequest, Pagination};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult, StoreError};
use crate::models::{
    ActivityBuilder, ActivityType, ModerationEvent, ModerationStatus, NewPresentation,
    Presentation, PresentationFilter, StatusChange, TeamPermission, User,
};
use crate::services::activity::ActivityLogger;
use crate::services::authorization::AuthorizationGate;
use crate::store::{PresentationStore, Stores};

const MAX_TITLE_LENGTH: usize = 200;
const MAX_NOTES_LENGTH: usize = 1000;

fn presentation_not_found() -> DomainError {
    DomainError::NotFound("Presentation not found".into())
}

#[derive(Clone)]
pub struct ModerationService {
    gate: AuthorizationGate,
    activity: ActivityLogger,
    presentations: Arc<dyn PresentationStore>,
}

impl ModerationService {
    pub fn new(stores: &Stores, gate: AuthorizationGate, activity: ActivityLogger) -> Self {
        Self {
            gate,
            activity,
            presentations: stores.presentations.clone(),
        }
    }

    async fn find(&self, id: Uuid) -> DomainResult<Presentation> {
        self.presentations
            .find_presentation(id)
            .await?
            .ok_or_else(presentation_not_found)
    }

    async fn record_deleted(&self, presentation: &Presentation, actor: &User, permanent: bool) {
        let Some(team_id) = presentation.team_id else {
            return;
        };
        self.activity
            .record(
                ActivityBuilder::new(
                    team_id,
                    &actor.id,
                    actor.actor_name(),
                    ActivityType::PresentationDeleted,
                )
                .on_target("presentation", presentation.id.to_string())
                .with_target_name(presentation.title.clone())
                .with_detail("permanent", permanent)
                .build(),
            )
            .await;
    }

    pub async fn create_presentation(
        &self,
        actor_id: &str,
        title: &str,
        team_id: Option<Uuid>,
    ) -> DomainResult<Presentation> {
        let title = title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::Validation(
                "Title must be between 1 and 200 characters".into(),
            ));
        }

        let actor = match team_id {
            Some(team_id) => {
                self.gate
                    .require_team_permission(team_id, actor_id, TeamPermission::Editor)
                    .await?
                    .actor
            }
            None => self.gate.load_actor(actor_id).await?,
        };

        let presentation = self
            .presentations
            .create_presentation(NewPresentation {
                title: title.to_string(),
                team_id,
                owner_id: actor.id.clone(),
            })
            .await?;

        if let Some(team_id) = team_id {
            self.activity
                .record(
                    ActivityBuilder::new(
                        team_id,
                        &actor.id,
                        actor.actor_name(),
                        ActivityType::PresentationCreated,
                    )
                    .on_target("presentation", presentation.id.to_string())
                    .with_target_name(presentation.title.clone())
                    .build(),
                )
                .await;
        }

        info!(presentation_id = %presentation.id, owner_id = %actor.id, "Presentation created");

        Ok(presentation)
    }

    /// Non-admin retrieval. Deleted records, and taken-down records of other
    /// owners, are reported as absent.
    pub async fn get_presentation(&self, id: Uuid, actor_id: &str) -> DomainResult<Presentation> {
        let actor = self.gate.load_actor(actor_id).await?;
        let presentation = self.find(id).await?;
        if actor.is_app_admin {
            return Ok(presentation);
        }
        if !presentation.is_visible_to(&actor.id) {
            return Err(presentation_not_found());
        }

        if let Some(team_id) = presentation.team_id {
            if presentation.owner_id != actor.id
                && !self
                    .gate
                    .team_permission(team_id, &actor.id)
                    .await?
                    .allows(TeamPermission::Viewer)
            {
                return Err(DomainError::AuthorizationDenied(
                    "Not a member of this presentation's team".into(),
                ));
            }
        }

        Ok(presentation)
    }

    pub async fn admin_get_presentation(
        &self,
        id: Uuid,
        actor_id: &str,
    ) -> DomainResult<Presentation> {
        self.gate.require_platform_admin(actor_id).await?;
        self.find(id).await
    }

    pub async fn admin_list_presentations(
        &self,
        actor_id: &str,
        filter: &PresentationFilter,
        page: &PageRequest,
    ) -> DomainResult<(Vec<Presentation>, Pagination)> {
        self.gate.require_platform_admin(actor_id).await?;
        let (items, total) = self.presentations.list_presentations(filter, page).await?;
        Ok((items, Pagination::new(page, total)))
    }

    /// Team listing (viewer+): neither deleted nor taken down.
    pub async fn list_team_presentations(
        &self,
        team_id: Uuid,
        actor_id: &str,
        page: &PageRequest,
    ) -> DomainResult<(Vec<Presentation>, Pagination)> {
        self.gate
            .require_team_permission(team_id, actor_id, TeamPermission::Viewer)
            .await?;
        let filter = PresentationFilter {
            team_id: Some(team_id),
            include_deleted: false,
            exclude_taken_down: true,
            ..Default::default()
        };
        let (items, total) = self.presentations.list_presentations(&filter, page).await?;
        Ok((items, Pagination::new(page, total)))
    }

    /// Move to `status`. Same-status changes are recorded too.
    pub async fn set_status(
        &self,
        id: Uuid,
        actor_id: &str,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> DomainResult<(Presentation, ModerationEvent)> {
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if notes
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_NOTES_LENGTH)
        {
            return Err(DomainError::Validation(
                "Notes must be at most 1000 characters".into(),
            ));
        }

        let cap = self.gate.require_platform_admin(actor_id).await?;
        let (presentation, event) = self
            .presentations
            .set_moderation_status(
                id,
                StatusChange {
                    status,
                    notes,
                    actor_id: cap.actor.id.clone(),
                    at: Utc::now(),
                },
            )
            .await
            .map_err(|e| match e {
                StoreError::NotFound => presentation_not_found(),
                other => other.into(),
            })?;

        info!(
            presentation_id = %id,
            from = %event.from_status,
            to = %event.to_status,
            moderated_by = %cap.actor.id,
            "Moderation status changed"
        );

        Ok((presentation, event))
    }

    /// Soft-delete (platform admin or the presentation's owner).
    pub async fn soft_delete(&self, id: Uuid, actor_id: &str) -> DomainResult<Presentation> {
        let actor = self.gate.load_actor(actor_id).await?;
        let presentation = self.find(id).await?;
        if !actor.is_app_admin && presentation.owner_id != actor.id {
            return Err(DomainError::AuthorizationDenied(
                "Only the owner or a platform admin can delete this presentation".into(),
            ));
        }
        if presentation.deleted {
            warn!(presentation_id = %id, "Soft-delete of an already deleted presentation");
            return Err(DomainError::PreconditionFailed(
                "Presentation is already deleted".into(),
            ));
        }

        let deleted = self
            .presentations
            .mark_deleted(id, &actor.id, Utc::now())
            .await?
            .ok_or_else(|| {
                DomainError::PreconditionFailed("Presentation is already deleted".into())
            })?;

        self.record_deleted(&deleted, &actor, false).await;
        info!(presentation_id = %id, deleted_by = %actor.id, "Presentation soft-deleted");

        Ok(deleted)
    }

    /// Undo a soft-delete. Moderation status is left untouched.
    pub async fn restore(&self, id: Uuid, actor_id: &str) -> DomainResult<Presentation> {
        let cap = self.gate.require_platform_admin(actor_id).await?;
        let presentation = self.find(id).await?;
        if !presentation.deleted {
            warn!(presentation_id = %id, "Restore of a presentation that is not deleted");
            return Err(DomainError::PreconditionFailed(
                "Presentation is not deleted".into(),
            ));
        }

        let restored = self
            .presentations
            .mark_restored(id)
            .await?
            .ok_or_else(|| DomainError::PreconditionFailed("Presentation is not deleted".into()))?;

        info!(presentation_id = %id, restored_by = %cap.actor.id, "Presentation restored");

        Ok(restored)
    }

    /// Irreversibly remove a soft-deleted presentation and its history.
    pub async fn permanent_delete(&self, id: Uuid, actor_id: &str) -> DomainResult<()> {
        let cap = self.gate.require_platform_admin(actor_id).await?;
        let presentation = self.find(id).await?;
        if !presentation.deleted {
            warn!(presentation_id = %id, "Permanent delete without prior soft-delete");
            return Err(DomainError::PreconditionFailed(
                "Presentation must be soft-deleted before permanent deletion".into(),
            ));
        }

        if !self.presentations.purge_presentation(id).await? {
            return Err(DomainError::PreconditionFailed(
                "Presentation must be soft-deleted before permanent deletion".into(),
            ));
        }

        self.record_deleted(&presentation, &cap.actor, true).await;
        info!(presentation_id = %id, deleted_by = %cap.actor.id, "Presentation permanently deleted");

        Ok(())
    }

    pub async fn moderation_history(
        &self,
        id: Uuid,
        actor_id: &str,
    ) -> DomainResult<Vec<ModerationEvent>> {
        self.gate.require_platform_admin(actor_id).await?;
        self.find(id).await?;
        Ok(self.presentations.moderation_history(id).await?)
    }
}
