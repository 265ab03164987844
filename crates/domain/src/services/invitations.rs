//! Invitation workflow engine.
//!
//! An invitation moves from pending to accepted or declined and is deleted in
//! both cases. A second response to the same id is therefore `NotFound`.

use std::sync::Arc;

use chrono::Utc;
use shared::validation::{normalize_email, validate_email_address};
use tracing::info;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult, StoreError};
use crate::models::{
    ActivityBuilder, ActivityType, InvitationOutcome, InvitationResponseAction, NewInvitation,
    PendingInvitation, Role, TeamPermission,
};
use crate::services::activity::ActivityLogger;
use crate::services::authorization::AuthorizationGate;
use crate::store::{InvitationStore, Stores, TeamStore, UserStore};

fn already_resolved() -> DomainError {
    DomainError::NotFound("Invitation not found or already resolved".into())
}

#[derive(Clone)]
pub struct InvitationService {
    gate: AuthorizationGate,
    activity: ActivityLogger,
    users: Arc<dyn UserStore>,
    teams: Arc<dyn TeamStore>,
    invitations: Arc<dyn InvitationStore>,
}

impl InvitationService {
    pub fn new(stores: &Stores, gate: AuthorizationGate, activity: ActivityLogger) -> Self {
        Self {
            gate,
            activity,
            users: stores.users.clone(),
            teams: stores.teams.clone(),
            invitations: stores.invitations.clone(),
        }
    }

    /// Invite `email` to join `team_id` at `role`.
    ///
    /// Owners and admins may invite; only the owner may invite admins.
    pub async fn create_invitation(
        &self,
        team_id: Uuid,
        actor_id: &str,
        email: &str,
        role: Role,
    ) -> DomainResult<PendingInvitation> {
        if !role.is_invitable() {
            return Err(DomainError::Validation(
                "Role must be 'admin', 'editor' or 'viewer'".into(),
            ));
        }
        let email = normalize_email(email);
        validate_email_address(&email)?;

        let cap = self
            .gate
            .require_team_permission(team_id, actor_id, TeamPermission::Admin)
            .await?;
        if role == Role::Admin && !cap.is_owner() {
            return Err(DomainError::AuthorizationDenied(
                "Only the team owner can invite admins".into(),
            ));
        }

        if let Some(user) = self.users.find_user_by_email(&email).await? {
            if self.teams.find_member(team_id, &user.id).await?.is_some() {
                return Err(DomainError::Conflict(
                    "User is already a member of this team".into(),
                ));
            }
        }
        if self
            .invitations
            .find_invitation_by_email(team_id, &email)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(
                "An invitation is already pending for this email".into(),
            ));
        }

        // The unique (team_id, email) constraint settles concurrent invites.
        let invitation = self
            .invitations
            .create_invitation(NewInvitation {
                team_id,
                email,
                role,
                invited_by: cap.actor.id.clone(),
            })
            .await?;

        info!(
            invitation_id = %invitation.id,
            team_id = %team_id,
            role = %role,
            invited_by = %cap.actor.id,
            "Invitation created"
        );

        Ok(invitation)
    }

    /// Accept or decline an invitation addressed to the responder's email.
    pub async fn respond_to_invitation(
        &self,
        invitation_id: Uuid,
        responder_id: &str,
        action: InvitationResponseAction,
    ) -> DomainResult<InvitationOutcome> {
        let responder = self.gate.load_actor(responder_id).await?;
        let invitation = self
            .invitations
            .find_invitation(invitation_id)
            .await?
            .ok_or_else(already_resolved)?;

        if normalize_email(&responder.email) != invitation.email {
            return Err(DomainError::AuthorizationDenied(
                "This invitation was issued to a different email address".into(),
            ));
        }

        match action {
            InvitationResponseAction::Accept => {
                if responder.team_id.is_some() {
                    return Err(DomainError::Conflict(
                        "User already belongs to a team".into(),
                    ));
                }

                let membership = self
                    .invitations
                    .accept_invitation(invitation_id, &responder.id, Utc::now())
                    .await
                    .map_err(|e| match e {
                        StoreError::NotFound => already_resolved(),
                        other => other.into(),
                    })?;

                self.activity
                    .record(
                        ActivityBuilder::new(
                            invitation.team_id,
                            &responder.id,
                            responder.actor_name(),
                            ActivityType::MemberAdded,
                        )
                        .on_target("user", &responder.id)
                        .with_target_name(responder.actor_name())
                        .with_detail("role", membership.role.as_str())
                        .with_detail("invitation_id", invitation_id.to_string())
                        .with_detail("invited_by", invitation.invited_by.clone())
                        .build(),
                    )
                    .await;

                info!(
                    invitation_id = %invitation_id,
                    team_id = %invitation.team_id,
                    user_id = %responder.id,
                    role = %membership.role,
                    "Invitation accepted"
                );

                Ok(InvitationOutcome::Accepted { membership })
            }
            InvitationResponseAction::Decline => {
                if !self.invitations.delete_invitation(invitation_id).await? {
                    return Err(already_resolved());
                }

                info!(
                    invitation_id = %invitation_id,
                    team_id = %invitation.team_id,
                    user_id = %responder.id,
                    "Invitation declined"
                );

                Ok(InvitationOutcome::Declined {
                    invitation_id,
                    team_id: invitation.team_id,
                })
            }
        }
    }

    pub async fn list_team_invitations(
        &self,
        team_id: Uuid,
        actor_id: &str,
    ) -> DomainResult<Vec<PendingInvitation>> {
        self.gate
            .require_team_permission(team_id, actor_id, TeamPermission::Admin)
            .await?;
        Ok(self.invitations.list_team_invitations(team_id).await?)
    }

    /// Pending invitations addressed to the actor's email.
    pub async fn list_my_invitations(&self, actor_id: &str) -> DomainResult<Vec<PendingInvitation>> {
        let actor = self.gate.load_actor(actor_id).await?;
        Ok(self
            .invitations
            .list_invitations_for_email(&normalize_email(&actor.email))
            .await?)
    }

    pub async fn revoke_invitation(
        &self,
        team_id: Uuid,
        invitation_id: Uuid,
        actor_id: &str,
    ) -> DomainResult<()> {
        self.gate
            .require_team_permission(team_id, actor_id, TeamPermission::Admin)
            .await?;

        let invitation = self
            .invitations
            .find_invitation(invitation_id)
            .await?
            .filter(|i| i.team_id == team_id)
            .ok_or_else(already_resolved)?;
        if !self.invitations.delete_invitation(invitation.id).await? {
            return Err(already_resolved());
        }

        info!(
            invitation_id = %invitation_id,
            team_id = %team_id,
            revoked_by = %actor_id,
            "Invitation revoked"
        );

        Ok(())
    }
}
