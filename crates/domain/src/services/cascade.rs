//! Team deletion cascade coordinator.
//!
//! Deleting a team spans both stores with no shared transaction. Steps run in
//! a fixed order:
//!
//! 1. delete the team in the Primary store (memberships, invitations and the
//!    members' user mirrors go with it, in one transaction);
//! 2. clear `team_id` on every Secondary-store presentation referencing it.
//!
//! If step 2 fails after step 1 committed, the deletion is not rolled back.
//! The caller gets a `PartialFailure` naming the pending step, which
//! `retry_cascade` re-runs on its own.

use std::sync::Arc;

use metrics::counter;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult, StoreError};
use crate::models::{CascadeReport, CascadeStep, PartialFailure};
use crate::services::authorization::AuthorizationGate;
use crate::store::{PresentationStore, Stores, TeamStore};

#[derive(Clone)]
pub struct CascadeCoordinator {
    gate: AuthorizationGate,
    teams: Arc<dyn TeamStore>,
    presentations: Arc<dyn PresentationStore>,
}

impl CascadeCoordinator {
    pub fn new(stores: &Stores, gate: AuthorizationGate) -> Self {
        Self {
            gate,
            teams: stores.teams.clone(),
            presentations: stores.presentations.clone(),
        }
    }

    /// Delete a team and scrub references to it (platform admin).
    pub async fn delete_team(&self, team_id: Uuid, actor_id: &str) -> DomainResult<CascadeReport> {
        let cap = self.gate.require_platform_admin(actor_id).await?;
        self.teams
            .find_team(team_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Team not found".into()))?;

        let team = self
            .teams
            .delete_team(team_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Team not found".into()))?;

        info!(
            team_id = %team_id,
            deleted_by = %cap.actor.id,
            step = %CascadeStep::DeletePrimaryRecord,
            "Team record deleted"
        );

        let cleared = self.clear_references(team_id).await?;

        info!(
            team_id = %team_id,
            presentations_cleared = cleared,
            "Team deletion cascade completed"
        );

        Ok(CascadeReport {
            team_id,
            team_name: Some(team.name),
            completed_steps: CascadeStep::ALL.to_vec(),
            presentations_cleared: cleared,
        })
    }

    /// Re-run the presentation scrub for an already deleted team.
    ///
    /// Idempotent. Rejected with Conflict while the team still exists.
    pub async fn retry_cascade(&self, team_id: Uuid, actor_id: &str) -> DomainResult<CascadeReport> {
        let cap = self.gate.require_platform_admin(actor_id).await?;
        if self.teams.find_team(team_id).await?.is_some() {
            warn!(team_id = %team_id, "Cascade retry requested for a live team");
            return Err(DomainError::Conflict(
                "Team still exists; delete the team instead of retrying its cascade".into(),
            ));
        }

        let cleared = self.clear_references(team_id).await?;

        info!(
            team_id = %team_id,
            retried_by = %cap.actor.id,
            presentations_cleared = cleared,
            "Team deletion cascade retried"
        );

        Ok(CascadeReport {
            team_id,
            team_name: None,
            completed_steps: vec![CascadeStep::ClearPresentationTeamRefs],
            presentations_cleared: cleared,
        })
    }

    /// Step 2. Runs only once the team record is gone.
    async fn clear_references(&self, team_id: Uuid) -> DomainResult<u64> {
        self.presentations
            .clear_team_reference(team_id)
            .await
            .map_err(|e| self.partial_failure(team_id, e))
    }

    fn partial_failure(&self, team_id: Uuid, cause: StoreError) -> DomainError {
        counter!("cascade_partial_failures_total").increment(1);
        error!(
            team_id = %team_id,
            error = %cause,
            pending = %CascadeStep::ClearPresentationTeamRefs,
            "Team deleted but presentation references were not cleared"
        );

        DomainError::PartialFailure(PartialFailure {
            message: format!(
                "Team deleted, but presentation references could not be cleared: {}",
                cause
            ),
            team_id,
            completed: vec![CascadeStep::DeletePrimaryRecord],
            pending: vec![CascadeStep::ClearPresentationTeamRefs],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::testing::Fixture;
    use crate::store::UserStore;

    #[tokio::test]
    async fn test_delete_team_clears_presentation_refs() {
        let fx = Fixture::new().await;
        fx.admin("a").await;
        let team = fx.team("u1").await;
        fx.member(team.id, "u1", "u2", Role::Editor).await;
        let p1 = fx.presentation("u1", Some(team.id)).await;
        let p2 = fx.presentation("u2", Some(team.id)).await;
        let other = fx.presentation("u3", Some(Uuid::new_v4())).await;

        let report = fx.services.cascade.delete_team(team.id, "a").await.unwrap();
        assert_eq!(report.presentations_cleared, 2);
        assert_eq!(report.completed_steps, CascadeStep::ALL.to_vec());

        for id in [p1.id, p2.id] {
            let p = fx.secondary.find_presentation(id).await.unwrap().unwrap();
            assert_eq!(p.team_id, None);
        }
        let untouched = fx.secondary.find_presentation(other.id).await.unwrap().unwrap();
        assert!(untouched.team_id.is_some());

        assert!(fx.stores.teams.find_team(team.id).await.unwrap().is_none());
        for id in ["u1", "u2"] {
            let user = fx.stores.users.find_user(id).await.unwrap().unwrap();
            assert_eq!(user.team_id, None);
            assert_eq!(user.role, Role::Guest);
        }
    }

    #[tokio::test]
    async fn test_delete_team_requires_platform_admin() {
        let fx = Fixture::new().await;
        let team = fx.team("u1").await;
        let result = fx.services.cascade.delete_team(team.id, "u1").await;
        assert!(matches!(result, Err(DomainError::AuthorizationDenied(_))));
        assert!(fx.stores.teams.find_team(team.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_team_is_not_found() {
        let fx = Fixture::new().await;
        fx.admin("a").await;
        let result = fx.services.cascade.delete_team(Uuid::new_v4(), "a").await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_partial_failure_then_retry() {
        let fx = Fixture::new().await;
        fx.admin("a").await;
        let team = fx.team("u1").await;
        let p = fx.presentation("u1", Some(team.id)).await;

        fx.secondary.set_fail_bulk_updates(true);
        match fx.services.cascade.delete_team(team.id, "a").await {
            Err(DomainError::PartialFailure(failure)) => {
                assert_eq!(failure.team_id, team.id);
                assert_eq!(failure.completed, vec![CascadeStep::DeletePrimaryRecord]);
                assert_eq!(failure.pending, vec![CascadeStep::ClearPresentationTeamRefs]);
            }
            other => panic!("Expected PartialFailure, got {other:?}"),
        }

        // Step 1 stays committed; the presentation is orphaned.
        assert!(fx.stores.teams.find_team(team.id).await.unwrap().is_none());
        let orphan = fx.secondary.find_presentation(p.id).await.unwrap().unwrap();
        assert_eq!(orphan.team_id, Some(team.id));

        fx.secondary.set_fail_bulk_updates(false);
        let report = fx.services.cascade.retry_cascade(team.id, "a").await.unwrap();
        assert_eq!(report.presentations_cleared, 1);
        let fixed = fx.secondary.find_presentation(p.id).await.unwrap().unwrap();
        assert_eq!(fixed.team_id, None);

        let again = fx.services.cascade.retry_cascade(team.id, "a").await.unwrap();
        assert_eq!(again.presentations_cleared, 0);
    }

    #[tokio::test]
    async fn test_retry_rejected_for_live_team() {
        let fx = Fixture::new().await;
        fx.admin("a").await;
        let team = fx.team("u1").await;
        let result = fx.services.cascade.retry_cascade(team.id, "a").await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }
}
