//! Store ports.
//!
//! The Primary store owns users, teams, memberships, invitations and activity.
//! The Secondary store owns presentations and their moderation history. The
//! two are independent failure domains and never share a transaction.
//!
//! Every method that touches both a membership row and the user's mirrored
//! `team_id`/`role` does so atomically inside the implementation.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{
    ModerationEvent, NewActivity, NewInvitation, NewPresentation, NewTeam, NewUser,
    PendingInvitation, Presentation, PresentationFilter, Role, StatusChange, Team, TeamActivity,
    TeamMember, TeamProfileUpdate, TeamWithMembers, User,
};

pub use memory::{InMemoryPrimaryStore, InMemorySecondaryStore};

/// User records (Primary store).
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;

    /// Lookup by normalized email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Insert a new user as a guest, or refresh email/display name of an
    /// existing one. Membership fields are never touched.
    async fn upsert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn set_app_admin(&self, id: &str, is_app_admin: bool) -> StoreResult<User>;

    async fn set_disabled(&self, id: &str, disabled: bool) -> StoreResult<User>;

    /// Delete the user and any membership row they hold.
    async fn delete_user(&self, id: &str) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Teams and memberships (Primary store).
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Create the team, its owner membership and the owner's user mirror.
    ///
    /// Conflict if the owner already belongs to a team.
    async fn create_team(&self, team: NewTeam) -> StoreResult<TeamWithMembers>;

    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>>;

    async fn update_team_profile(&self, id: Uuid, update: TeamProfileUpdate) -> StoreResult<Team>;

    /// Delete the team with its memberships and invitations, resetting every
    /// former member to `team_id = null` / `guest`. Returns the deleted team.
    async fn delete_team(&self, id: Uuid) -> StoreResult<Option<Team>>;

    async fn list_members(&self, team_id: Uuid) -> StoreResult<Vec<TeamMember>>;

    async fn find_member(&self, team_id: Uuid, user_id: &str) -> StoreResult<Option<TeamMember>>;

    /// Change a member's role together with the user mirror.
    async fn update_member_role(
        &self,
        team_id: Uuid,
        user_id: &str,
        role: Role,
    ) -> StoreResult<TeamMember>;

    /// Remove a membership and reset the user mirror to guest.
    async fn remove_member(&self, team_id: Uuid, user_id: &str) -> StoreResult<bool>;

    /// Make `new_owner_id` the owner; the previous owner becomes admin.
    async fn transfer_ownership(&self, team_id: Uuid, new_owner_id: &str) -> StoreResult<Team>;

    async fn count_owned_teams(&self, user_id: &str) -> StoreResult<i64>;
}

/// Pending invitations (Primary store).
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Conflict if an invitation for (team, email) already exists.
    async fn create_invitation(&self, invitation: NewInvitation) -> StoreResult<PendingInvitation>;

    async fn find_invitation(&self, id: Uuid) -> StoreResult<Option<PendingInvitation>>;

    async fn find_invitation_by_email(
        &self,
        team_id: Uuid,
        email: &str,
    ) -> StoreResult<Option<PendingInvitation>>;

    async fn list_team_invitations(&self, team_id: Uuid) -> StoreResult<Vec<PendingInvitation>>;

    async fn list_invitations_for_email(&self, email: &str) -> StoreResult<Vec<PendingInvitation>>;

    /// Consume the invitation and add `user_id` to its team in one unit.
    ///
    /// NotFound if the invitation is gone. Conflict if the user already holds
    /// a membership. Nothing is written on failure.
    async fn accept_invitation(
        &self,
        id: Uuid,
        user_id: &str,
        joined_at: DateTime<Utc>,
    ) -> StoreResult<TeamMember>;

    async fn delete_invitation(&self, id: Uuid) -> StoreResult<bool>;
}

/// Append-only activity log (Primary store).
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn append(&self, entry: NewActivity) -> StoreResult<TeamActivity>;

    /// Newest first, with the total count for the team.
    async fn list_for_team(
        &self,
        team_id: Uuid,
        page: &PageRequest,
    ) -> StoreResult<(Vec<TeamActivity>, i64)>;
}

/// Presentations and moderation history (Secondary store).
#[async_trait]
pub trait PresentationStore: Send + Sync {
    async fn create_presentation(&self, presentation: NewPresentation) -> StoreResult<Presentation>;

    /// Includes soft-deleted records.
    async fn find_presentation(&self, id: Uuid) -> StoreResult<Option<Presentation>>;

    async fn list_presentations(
        &self,
        filter: &PresentationFilter,
        page: &PageRequest,
    ) -> StoreResult<(Vec<Presentation>, i64)>;

    /// Apply a status change and record it. NotFound if the record is absent.
    async fn set_moderation_status(
        &self,
        id: Uuid,
        change: StatusChange,
    ) -> StoreResult<(Presentation, ModerationEvent)>;

    /// Soft-delete. `None` if the record is absent or already deleted.
    async fn mark_deleted(
        &self,
        id: Uuid,
        actor_id: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Presentation>>;

    /// Undo a soft-delete. `None` if the record is absent or not deleted.
    async fn mark_restored(&self, id: Uuid) -> StoreResult<Option<Presentation>>;

    /// Remove a soft-deleted record and its history. `false` if nothing matched.
    async fn purge_presentation(&self, id: Uuid) -> StoreResult<bool>;

    async fn moderation_history(&self, id: Uuid) -> StoreResult<Vec<ModerationEvent>>;

    /// Null out `team_id` on every record pointing at `team_id`. Idempotent.
    async fn clear_team_reference(&self, team_id: Uuid) -> StoreResult<u64>;

    async fn ping(&self) -> StoreResult<()>;
}

/// Handles to every store port, shared by services and handlers.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub teams: Arc<dyn TeamStore>,
    pub invitations: Arc<dyn InvitationStore>,
    pub activities: Arc<dyn ActivityStore>,
    pub presentations: Arc<dyn PresentationStore>,
}

impl Stores {
    /// Wire all ports to in-memory stores.
    pub fn from_memory(
        primary: Arc<InMemoryPrimaryStore>,
        secondary: Arc<InMemorySecondaryStore>,
    ) -> Self {
        Self {
            users: primary.clone(),
            teams: primary.clone(),
            invitations: primary.clone(),
            activities: primary,
            presentations: secondary,
        }
    }

    /// Fresh, empty in-memory stores.
    pub fn in_memory() -> Self {
        Self::from_memory(
            Arc::new(InMemoryPrimaryStore::new()),
            Arc::new(InMemorySecondaryStore::new()),
        )
    }
}
