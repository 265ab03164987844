//! In-memory store implementations.
//!
//! Used by tests and by the `memory` storage backend. Each store keeps its
//! whole state behind one mutex so multi-record writes are atomic, mirroring
//! the transactions of the Postgres implementations. Uniqueness rules match
//! the SQL constraints: one membership per user, one invitation per
//! (team, email), one user per email.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::pagination::PageRequest;
use uuid::Uuid;

use super::{ActivityStore, InvitationStore, PresentationStore, TeamStore, UserStore};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    ModerationEvent, ModerationStatus, NewActivity, NewInvitation, NewPresentation, NewTeam,
    NewUser, PendingInvitation, Presentation, PresentationFilter, Role, StatusChange, Team,
    TeamActivity, TeamMember, TeamProfileUpdate, TeamWithMembers, User,
};

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".into())
}

#[derive(Default)]
struct PrimaryState {
    users: HashMap<String, User>,
    teams: HashMap<Uuid, Team>,
    members: BTreeMap<(Uuid, String), TeamMember>,
    invitations: HashMap<Uuid, PendingInvitation>,
    activities: Vec<TeamActivity>,
}

impl PrimaryState {
    fn membership_of(&self, user_id: &str) -> Option<&TeamMember> {
        self.members.values().find(|m| m.user_id == user_id)
    }

    fn team_members(&self, team_id: Uuid) -> Vec<TeamMember> {
        self.members
            .values()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect()
    }

    fn mirror_user(&mut self, user_id: &str, team_id: Option<Uuid>, role: Role) {
        if let Some(user) = self.users.get_mut(user_id) {
            user.team_id = team_id;
            user.role = role;
            user.updated_at = Utc::now();
        }
    }
}

/// Primary store held in process memory.
#[derive(Default)]
pub struct InMemoryPrimaryStore {
    state: Mutex<PrimaryState>,
    fail_activity_appends: AtomicBool,
}

impl InMemoryPrimaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every activity append fail with `Unavailable`.
    pub fn set_fail_activity_appends(&self, fail: bool) {
        self.fail_activity_appends.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, PrimaryState>> {
        self.state.lock().map_err(poisoned)
    }
}

#[async_trait]
impl UserStore for InMemoryPrimaryStore {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn upsert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.lock()?;
        if state
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(StoreError::Conflict("Email already in use".into()));
        }

        let now = Utc::now();
        let entry = state.users.entry(user.id.clone()).or_insert_with(|| User {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: None,
            team_id: None,
            role: Role::Guest,
            is_app_admin: false,
            disabled: false,
            created_at: now,
            updated_at: now,
        });
        entry.email = user.email;
        if user.display_name.is_some() {
            entry.display_name = user.display_name;
        }
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn set_app_admin(&self, id: &str, is_app_admin: bool) -> StoreResult<User> {
        let mut state = self.lock()?;
        let user = state.users.get_mut(id).ok_or(StoreError::NotFound)?;
        user.is_app_admin = is_app_admin;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_disabled(&self, id: &str, disabled: bool) -> StoreResult<User> {
        let mut state = self.lock()?;
        let user = state.users.get_mut(id).ok_or(StoreError::NotFound)?;
        user.disabled = disabled;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let mut state = self.lock()?;
        state.members.retain(|_, m| m.user_id != id);
        Ok(state.users.remove(id).is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl TeamStore for InMemoryPrimaryStore {
    async fn create_team(&self, team: NewTeam) -> StoreResult<TeamWithMembers> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&team.owner_id) {
            return Err(StoreError::NotFound);
        }
        if state.membership_of(&team.owner_id).is_some() {
            return Err(StoreError::Conflict("User already belongs to a team".into()));
        }

        let now = Utc::now();
        let created = Team {
            id: Uuid::new_v4(),
            name: team.name,
            owner_id: team.owner_id.clone(),
            settings: team.settings,
            created_at: now,
            updated_at: now,
        };
        let owner = TeamMember {
            team_id: created.id,
            user_id: team.owner_id.clone(),
            role: Role::Owner,
            joined_at: now,
            added_by: None,
        };

        state.teams.insert(created.id, created.clone());
        state
            .members
            .insert((created.id, team.owner_id.clone()), owner.clone());
        state.mirror_user(&team.owner_id, Some(created.id), Role::Owner);

        Ok(TeamWithMembers {
            team: created,
            members: vec![owner],
        })
    }

    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>> {
        Ok(self.lock()?.teams.get(&id).cloned())
    }

    async fn update_team_profile(&self, id: Uuid, update: TeamProfileUpdate) -> StoreResult<Team> {
        let mut state = self.lock()?;
        let team = state.teams.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = update.name {
            team.name = name;
        }
        if let Some(settings) = update.settings {
            team.settings = settings;
        }
        team.updated_at = Utc::now();
        Ok(team.clone())
    }

    async fn delete_team(&self, id: Uuid) -> StoreResult<Option<Team>> {
        let mut state = self.lock()?;
        let Some(team) = state.teams.remove(&id) else {
            return Ok(None);
        };

        let former: Vec<String> = state
            .team_members(id)
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        state.members.retain(|(team_id, _), _| *team_id != id);
        for user_id in &former {
            state.mirror_user(user_id, None, Role::Guest);
        }
        state.invitations.retain(|_, inv| inv.team_id != id);

        Ok(Some(team))
    }

    async fn list_members(&self, team_id: Uuid) -> StoreResult<Vec<TeamMember>> {
        let mut members = self.lock()?.team_members(team_id);
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(members)
    }

    async fn find_member(&self, team_id: Uuid, user_id: &str) -> StoreResult<Option<TeamMember>> {
        Ok(self
            .lock()?
            .members
            .get(&(team_id, user_id.to_string()))
            .cloned())
    }

    async fn update_member_role(
        &self,
        team_id: Uuid,
        user_id: &str,
        role: Role,
    ) -> StoreResult<TeamMember> {
        let mut state = self.lock()?;
        let member = state
            .members
            .get_mut(&(team_id, user_id.to_string()))
            .ok_or(StoreError::NotFound)?;
        member.role = role;
        let updated = member.clone();
        state.mirror_user(user_id, Some(team_id), role);
        Ok(updated)
    }

    async fn remove_member(&self, team_id: Uuid, user_id: &str) -> StoreResult<bool> {
        let mut state = self.lock()?;
        if state
            .members
            .remove(&(team_id, user_id.to_string()))
            .is_none()
        {
            return Ok(false);
        }
        state.mirror_user(user_id, None, Role::Guest);
        Ok(true)
    }

    async fn transfer_ownership(&self, team_id: Uuid, new_owner_id: &str) -> StoreResult<Team> {
        let mut state = self.lock()?;
        let old_owner_id = state
            .teams
            .get(&team_id)
            .map(|t| t.owner_id.clone())
            .ok_or(StoreError::NotFound)?;
        let new_key = (team_id, new_owner_id.to_string());
        if !state.members.contains_key(&new_key) {
            return Err(StoreError::NotFound);
        }

        if let Some(old) = state.members.get_mut(&(team_id, old_owner_id.clone())) {
            old.role = Role::Admin;
        }
        if let Some(new) = state.members.get_mut(&new_key) {
            new.role = Role::Owner;
        }
        state.mirror_user(&old_owner_id, Some(team_id), Role::Admin);
        state.mirror_user(new_owner_id, Some(team_id), Role::Owner);

        let team = state.teams.get_mut(&team_id).ok_or(StoreError::NotFound)?;
        team.owner_id = new_owner_id.to_string();
        team.updated_at = Utc::now();
        Ok(team.clone())
    }

    async fn count_owned_teams(&self, user_id: &str) -> StoreResult<i64> {
        Ok(self
            .lock()?
            .teams
            .values()
            .filter(|t| t.owner_id == user_id)
            .count() as i64)
    }
}

#[async_trait]
impl InvitationStore for InMemoryPrimaryStore {
    async fn create_invitation(&self, invitation: NewInvitation) -> StoreResult<PendingInvitation> {
        let mut state = self.lock()?;
        if !state.teams.contains_key(&invitation.team_id) {
            return Err(StoreError::NotFound);
        }
        if state
            .invitations
            .values()
            .any(|i| i.team_id == invitation.team_id && i.email == invitation.email)
        {
            return Err(StoreError::Conflict(
                "An invitation is already pending for this email".into(),
            ));
        }

        let created = PendingInvitation {
            id: Uuid::new_v4(),
            team_id: invitation.team_id,
            email: invitation.email,
            role: invitation.role,
            invited_by: invitation.invited_by,
            invited_at: Utc::now(),
        };
        state.invitations.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_invitation(&self, id: Uuid) -> StoreResult<Option<PendingInvitation>> {
        Ok(self.lock()?.invitations.get(&id).cloned())
    }

    async fn find_invitation_by_email(
        &self,
        team_id: Uuid,
        email: &str,
    ) -> StoreResult<Option<PendingInvitation>> {
        Ok(self
            .lock()?
            .invitations
            .values()
            .find(|i| i.team_id == team_id && i.email == email)
            .cloned())
    }

    async fn list_team_invitations(&self, team_id: Uuid) -> StoreResult<Vec<PendingInvitation>> {
        let mut invitations: Vec<_> = self
            .lock()?
            .invitations
            .values()
            .filter(|i| i.team_id == team_id)
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.invited_at.cmp(&a.invited_at));
        Ok(invitations)
    }

    async fn list_invitations_for_email(&self, email: &str) -> StoreResult<Vec<PendingInvitation>> {
        let mut invitations: Vec<_> = self
            .lock()?
            .invitations
            .values()
            .filter(|i| i.email == email)
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.invited_at.cmp(&a.invited_at));
        Ok(invitations)
    }

    async fn accept_invitation(
        &self,
        id: Uuid,
        user_id: &str,
        joined_at: DateTime<Utc>,
    ) -> StoreResult<TeamMember> {
        let mut state = self.lock()?;
        // Validate everything before the first write so a failure leaves no trace.
        let invitation = state
            .invitations
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)?;
        if !state.teams.contains_key(&invitation.team_id) || !state.users.contains_key(user_id) {
            return Err(StoreError::NotFound);
        }
        if state.membership_of(user_id).is_some() {
            return Err(StoreError::Conflict("User already belongs to a team".into()));
        }

        state.invitations.remove(&id);
        let member = TeamMember {
            team_id: invitation.team_id,
            user_id: user_id.to_string(),
            role: invitation.role,
            joined_at,
            added_by: Some(invitation.invited_by),
        };
        state
            .members
            .insert((invitation.team_id, user_id.to_string()), member.clone());
        state.mirror_user(user_id, Some(invitation.team_id), invitation.role);
        Ok(member)
    }

    async fn delete_invitation(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.lock()?.invitations.remove(&id).is_some())
    }
}

#[async_trait]
impl ActivityStore for InMemoryPrimaryStore {
    async fn append(&self, entry: NewActivity) -> StoreResult<TeamActivity> {
        if self.fail_activity_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("activity log unavailable".into()));
        }
        let activity = TeamActivity {
            id: Uuid::new_v4(),
            team_id: entry.team_id,
            actor_id: entry.actor_id,
            actor_name: entry.actor_name,
            action_type: entry.action_type,
            target_type: entry.target_type,
            target_id: entry.target_id,
            target_name: entry.target_name,
            details: entry.details,
            created_at: Utc::now(),
        };
        self.lock()?.activities.push(activity.clone());
        Ok(activity)
    }

    async fn list_for_team(
        &self,
        team_id: Uuid,
        page: &PageRequest,
    ) -> StoreResult<(Vec<TeamActivity>, i64)> {
        let state = self.lock()?;
        let matching: Vec<TeamActivity> = state
            .activities
            .iter()
            .rev()
            .filter(|a| a.team_id == team_id)
            .cloned()
            .collect();
        let total = matching.len() as i64;
        Ok((shared::pagination::paginate(&matching, page), total))
    }
}

#[derive(Default)]
struct SecondaryState {
    presentations: HashMap<Uuid, Presentation>,
    events: Vec<ModerationEvent>,
}

/// Secondary store held in process memory.
#[derive(Default)]
pub struct InMemorySecondaryStore {
    state: Mutex<SecondaryState>,
    fail_bulk_updates: AtomicBool,
}

impl InMemorySecondaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `clear_team_reference` fail with `Unavailable`.
    pub fn set_fail_bulk_updates(&self, fail: bool) {
        self.fail_bulk_updates.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, SecondaryState>> {
        self.state.lock().map_err(poisoned)
    }
}

#[async_trait]
impl PresentationStore for InMemorySecondaryStore {
    async fn create_presentation(&self, presentation: NewPresentation) -> StoreResult<Presentation> {
        let now = Utc::now();
        let created = Presentation {
            id: Uuid::new_v4(),
            title: presentation.title,
            team_id: presentation.team_id,
            owner_id: presentation.owner_id,
            moderation_status: ModerationStatus::Active,
            moderation_notes: None,
            moderated_by: None,
            moderated_at: None,
            deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_at: now,
            updated_at: now,
        };
        self.lock()?
            .presentations
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_presentation(&self, id: Uuid) -> StoreResult<Option<Presentation>> {
        Ok(self.lock()?.presentations.get(&id).cloned())
    }

    async fn list_presentations(
        &self,
        filter: &PresentationFilter,
        page: &PageRequest,
    ) -> StoreResult<(Vec<Presentation>, i64)> {
        let state = self.lock()?;
        let mut matching: Vec<Presentation> = state
            .presentations
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let total = matching.len() as i64;
        Ok((shared::pagination::paginate(&matching, page), total))
    }

    async fn set_moderation_status(
        &self,
        id: Uuid,
        change: StatusChange,
    ) -> StoreResult<(Presentation, ModerationEvent)> {
        let mut state = self.lock()?;
        let presentation = state
            .presentations
            .get_mut(&id)
            .ok_or(StoreError::NotFound)?;

        let event = ModerationEvent {
            id: Uuid::new_v4(),
            presentation_id: id,
            from_status: presentation.moderation_status,
            to_status: change.status,
            actor_id: change.actor_id.clone(),
            notes: change.notes.clone(),
            created_at: change.at,
        };
        presentation.moderation_status = change.status;
        presentation.moderation_notes = change.notes;
        presentation.moderated_by = Some(change.actor_id);
        presentation.moderated_at = Some(change.at);
        presentation.updated_at = change.at;
        let updated = presentation.clone();

        state.events.push(event.clone());
        Ok((updated, event))
    }

    async fn mark_deleted(
        &self,
        id: Uuid,
        actor_id: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Presentation>> {
        let mut state = self.lock()?;
        match state.presentations.get_mut(&id) {
            Some(p) if !p.deleted => {
                p.deleted = true;
                p.deleted_at = Some(at);
                p.deleted_by = Some(actor_id.to_string());
                p.updated_at = at;
                Ok(Some(p.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_restored(&self, id: Uuid) -> StoreResult<Option<Presentation>> {
        let mut state = self.lock()?;
        match state.presentations.get_mut(&id) {
            Some(p) if p.deleted => {
                p.deleted = false;
                p.deleted_at = None;
                p.deleted_by = None;
                p.updated_at = Utc::now();
                Ok(Some(p.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn purge_presentation(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.lock()?;
        if !state.presentations.get(&id).is_some_and(|p| p.deleted) {
            return Ok(false);
        }
        state.presentations.remove(&id);
        state.events.retain(|e| e.presentation_id != id);
        Ok(true)
    }

    async fn moderation_history(&self, id: Uuid) -> StoreResult<Vec<ModerationEvent>> {
        Ok(self
            .lock()?
            .events
            .iter()
            .filter(|e| e.presentation_id == id)
            .cloned()
            .collect())
    }

    async fn clear_team_reference(&self, team_id: Uuid) -> StoreResult<u64> {
        if self.fail_bulk_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("secondary store unavailable".into()));
        }
        let mut state = self.lock()?;
        let now = Utc::now();
        let mut cleared = 0;
        for p in state
            .presentations
            .values_mut()
            .filter(|p| p.team_id == Some(team_id))
        {
            p.team_id = None;
            p.updated_at = now;
            cleared += 1;
        }
        Ok(cleared)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }
}
