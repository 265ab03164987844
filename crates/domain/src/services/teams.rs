//! Team membership service.
//!
//! Keeps the single-owner invariant: the owner's membership is never removed
//! or re-roled here, and ownership only moves through `transfer_ownership`.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use shared::pagination::{PageRequest, Pagination};
use tracing::info;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::team::{validate_settings, validate_team_name};
use crate::models::{
    ActivityBuilder, ActivityType, NewTeam, Role, Team, TeamActivity, TeamMember,
    TeamPermission, TeamProfileUpdate, TeamWithMembers,
};
use crate::services::activity::ActivityLogger;
use crate::services::authorization::AuthorizationGate;
use crate::store::{Stores, TeamStore, UserStore};

#[derive(Clone)]
pub struct TeamService {
    gate: AuthorizationGate,
    activity: ActivityLogger,
    users: Arc<dyn UserStore>,
    teams: Arc<dyn TeamStore>,
}

impl TeamService {
    pub fn new(stores: &Stores, gate: AuthorizationGate, activity: ActivityLogger) -> Self {
        Self {
            gate,
            activity,
            users: stores.users.clone(),
            teams: stores.teams.clone(),
        }
    }

    /// Display name for activity targets, falling back to the raw id.
    async fn user_name(&self, user_id: &str) -> String {
        match self.users.find_user(user_id).await {
            Ok(Some(user)) => user.actor_name(),
            _ => user_id.to_string(),
        }
    }

    /// Create a team owned by the actor.
    pub async fn create_team(
        &self,
        actor_id: &str,
        name: &str,
        settings: Option<JsonValue>,
    ) -> DomainResult<TeamWithMembers> {
        let name = name.trim();
        validate_team_name(name)?;
        let settings = settings.unwrap_or_else(|| json!({}));
        validate_settings(&settings)?;

        let actor = self.gate.load_actor(actor_id).await?;
        if actor.team_id.is_some() {
            return Err(DomainError::Conflict("User already belongs to a team".into()));
        }

        let created = self
            .teams
            .create_team(NewTeam {
                name: name.to_string(),
                owner_id: actor.id.clone(),
                settings,
            })
            .await?;

        self.activity
            .record(
                ActivityBuilder::new(
                    created.team.id,
                    &actor.id,
                    actor.actor_name(),
                    ActivityType::TeamCreated,
                )
                .on_target("team", created.team.id.to_string())
                .with_target_name(created.team.name.clone())
                .build(),
            )
            .await;

        info!(team_id = %created.team.id, owner_id = %actor.id, "Team created");

        Ok(created)
    }

    pub async fn get_team(&self, team_id: Uuid, actor_id: &str) -> DomainResult<TeamWithMembers> {
        let cap = self
            .gate
            .require_team_permission(team_id, actor_id, TeamPermission::Viewer)
            .await?;
        let members = self.teams.list_members(team_id).await?;
        Ok(TeamWithMembers {
            team: cap.team,
            members,
        })
    }

    pub async fn list_members(&self, team_id: Uuid, actor_id: &str) -> DomainResult<Vec<TeamMember>> {
        self.gate
            .require_team_permission(team_id, actor_id, TeamPermission::Viewer)
            .await?;
        Ok(self.teams.list_members(team_id).await?)
    }

    /// Update name and/or settings (admin+).
    pub async fn update_team_profile(
        &self,
        team_id: Uuid,
        actor_id: &str,
        update: TeamProfileUpdate,
    ) -> DomainResult<Team> {
        if update.is_empty() {
            return Err(DomainError::Validation("No changes provided".into()));
        }
        let update = TeamProfileUpdate {
            name: update.name.map(|n| n.trim().to_string()),
            settings: update.settings,
        };
        if let Some(name) = &update.name {
            validate_team_name(name)?;
        }
        if let Some(settings) = &update.settings {
            validate_settings(settings)?;
        }

        let cap = self
            .gate
            .require_team_permission(team_id, actor_id, TeamPermission::Admin)
            .await?;

        let mut changed_fields = Vec::new();
        if update.name.is_some() {
            changed_fields.push("name");
        }
        if update.settings.is_some() {
            changed_fields.push("settings");
        }

        let team = self.teams.update_team_profile(team_id, update).await?;

        let mut entry = ActivityBuilder::new(
            team_id,
            &cap.actor.id,
            cap.actor.actor_name(),
            ActivityType::TeamProfileUpdated,
        )
        .on_target("team", team_id.to_string())
        .with_target_name(team.name.clone())
        .with_detail("changed_fields", changed_fields.clone());
        if team.name != cap.team.name {
            entry = entry.with_detail("previous_name", cap.team.name.clone());
        }
        self.activity.record(entry.build()).await;

        info!(team_id = %team_id, updated_by = %cap.actor.id, fields = ?changed_fields, "Team profile updated");

        Ok(team)
    }

    /// Change a member's role (admin+). Only the owner may grant or revoke admin.
    pub async fn change_member_role(
        &self,
        team_id: Uuid,
        actor_id: &str,
        target_id: &str,
        role: Role,
    ) -> DomainResult<TeamMember> {
        match role {
            Role::Owner => {
                return Err(DomainError::Validation(
                    "The owner role can only be assigned by transferring ownership".into(),
                ))
            }
            Role::Guest => {
                return Err(DomainError::Validation(
                    "Role must be 'admin', 'editor' or 'viewer'".into(),
                ))
            }
            _ => {}
        }

        let cap = self
            .gate
            .require_team_permission(team_id, actor_id, TeamPermission::Admin)
            .await?;
        AuthorizationGate::ensure_not_self(actor_id, target_id, "change the team role of")?;

        let member = self
            .teams
            .find_member(team_id, target_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Member not found".into()))?;
        if member.role == Role::Owner {
            return Err(DomainError::Conflict(
                "The team owner's role cannot be changed".into(),
            ));
        }
        if (role == Role::Admin || member.role == Role::Admin) && !cap.is_owner() {
            return Err(DomainError::AuthorizationDenied(
                "Only the team owner can grant or revoke the admin role".into(),
            ));
        }
        if member.role == role {
            return Ok(member);
        }

        let updated = self
            .teams
            .update_member_role(team_id, target_id, role)
            .await?;

        self.activity
            .record(
                ActivityBuilder::new(
                    team_id,
                    &cap.actor.id,
                    cap.actor.actor_name(),
                    ActivityType::MemberRoleChanged,
                )
                .on_target("user", target_id)
                .with_target_name(self.user_name(target_id).await)
                .with_detail("from", member.role.as_str())
                .with_detail("to", role.as_str())
                .build(),
            )
            .await;

        info!(
            team_id = %team_id,
            user_id = %target_id,
            from = %member.role,
            to = %role,
            changed_by = %cap.actor.id,
            "Member role changed"
        );

        Ok(updated)
    }

    /// Remove a member, or let a member leave. The owner can do neither.
    pub async fn remove_member(
        &self,
        team_id: Uuid,
        actor_id: &str,
        target_id: &str,
    ) -> DomainResult<()> {
        let leaving = actor_id == target_id;
        let minimum = if leaving {
            TeamPermission::Viewer
        } else {
            TeamPermission::Admin
        };
        let cap = self
            .gate
            .require_team_permission(team_id, actor_id, minimum)
            .await?;

        let member = self
            .teams
            .find_member(team_id, target_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Member not found".into()))?;
        if member.role == Role::Owner {
            let message = if leaving {
                "The team owner cannot leave; transfer ownership first"
            } else {
                "The team owner cannot be removed"
            };
            return Err(DomainError::Conflict(message.into()));
        }
        if !leaving && member.role == Role::Admin && !cap.is_owner() {
            return Err(DomainError::AuthorizationDenied(
                "Admins cannot remove other admins".into(),
            ));
        }

        let target_name = self.user_name(target_id).await;
        if !self.teams.remove_member(team_id, target_id).await? {
            return Err(DomainError::NotFound("Member not found".into()));
        }

        self.activity
            .record(
                ActivityBuilder::new(
                    team_id,
                    &cap.actor.id,
                    cap.actor.actor_name(),
                    ActivityType::MemberRemoved,
                )
                .on_target("user", target_id)
                .with_target_name(target_name)
                .with_detail("role", member.role.as_str())
                .with_detail("left", leaving)
                .build(),
            )
            .await;

        info!(team_id = %team_id, user_id = %target_id, removed_by = %actor_id, "Member removed");

        Ok(())
    }

    /// Hand ownership to another member; the previous owner becomes admin.
    pub async fn transfer_ownership(
        &self,
        team_id: Uuid,
        actor_id: &str,
        new_owner_id: &str,
    ) -> DomainResult<Team> {
        let cap = self
            .gate
            .require_team_permission(team_id, actor_id, TeamPermission::Owner)
            .await?;
        let previous_owner = cap.team.owner_id.clone();
        if previous_owner == new_owner_id {
            return Err(DomainError::Conflict("User already owns this team".into()));
        }

        let new_owner = self
            .teams
            .find_member(team_id, new_owner_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound("New owner must be a member of this team".into())
            })?;

        let team = self.teams.transfer_ownership(team_id, new_owner_id).await?;

        for (user_id, from, to) in [
            (previous_owner.as_str(), Role::Owner, Role::Admin),
            (new_owner_id, new_owner.role, Role::Owner),
        ] {
            self.activity
                .record(
                    ActivityBuilder::new(
                        team_id,
                        &cap.actor.id,
                        cap.actor.actor_name(),
                        ActivityType::MemberRoleChanged,
                    )
                    .on_target("user", user_id)
                    .with_target_name(self.user_name(user_id).await)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
                    .with_detail("ownership_transfer", true)
                    .build(),
                )
                .await;
        }

        info!(
            team_id = %team_id,
            previous_owner = %previous_owner,
            new_owner = %new_owner_id,
            "Team ownership transferred"
        );

        Ok(team)
    }

    /// Activity feed (viewer+), newest first.
    pub async fn list_activity(
        &self,
        team_id: Uuid,
        actor_id: &str,
        page: &PageRequest,
    ) -> DomainResult<(Vec<TeamActivity>, Pagination)> {
        self.gate
            .require_team_permission(team_id, actor_id, TeamPermission::Viewer)
            .await?;
        let (items, total) = self.activity.list(team_id, page).await?;
        Ok((items, Pagination::new(page, total)))
    }
}
