//! Team, membership and cascade routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CascadeReport, ChangeMemberRoleRequest, CreateInvitationRequest, CreateTeamRequest,
    PendingInvitation, Presentation, Role, Team, TeamActivity, TeamMember, TeamProfileUpdate,
    TeamWithMembers, TransferOwnershipRequest, UpdateTeamRequest,
};
use serde::Serialize;
use shared::pagination::{PageRequest, Pagination};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{respond, ApiResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ActingUser, AppJson, AppQuery};

#[derive(Debug, Serialize)]
pub struct TeamPayload {
    pub team: TeamWithMembers,
}

#[derive(Debug, Serialize)]
pub struct TeamProfilePayload {
    pub team: Team,
}

#[derive(Debug, Serialize)]
pub struct MembersPayload {
    pub members: Vec<TeamMember>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MemberPayload {
    pub member: TeamMember,
}

#[derive(Debug, Serialize)]
pub struct InvitationPayload {
    pub invitation: PendingInvitation,
}

#[derive(Debug, Serialize)]
pub struct InvitationsPayload {
    pub invitations: Vec<PendingInvitation>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ActivityPayload {
    pub activities: Vec<TeamActivity>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct PresentationsPayload {
    pub presentations: Vec<Presentation>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct CascadePayload {
    pub cascade: CascadeReport,
}

/// Create a team owned by the caller.
///
/// POST /api/v1/teams
pub async fn create_team(
    State(state): State<AppState>,
    actor: ActingUser,
    AppJson(request): AppJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TeamPayload>>), ApiError> {
    request.validate()?;

    let team = state
        .services
        .teams
        .create_team(&actor.user_id, &request.name, request.settings)
        .await?;

    Ok((
        StatusCode::CREATED,
        respond("Team created", TeamPayload { team }),
    ))
}

/// Get a team with its members.
///
/// GET /api/v1/teams/:team_id
pub async fn get_team(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(team_id): Path<Uuid>,
) -> Result<Json<ApiResponse<TeamPayload>>, ApiError> {
    let team = state.services.teams.get_team(team_id, &actor.user_id).await?;
    Ok(respond("Team loaded", TeamPayload { team }))
}

/// Update a team's name or settings.
///
/// PUT /api/v1/teams/:team_id
pub async fn update_team(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(team_id): Path<Uuid>,
    AppJson(request): AppJson<UpdateTeamRequest>,
) -> Result<Json<ApiResponse<TeamProfilePayload>>, ApiError> {
    request.validate()?;

    let update = TeamProfileUpdate {
        name: request.name,
        settings: request.settings,
    };
    let team = state
        .services
        .teams
        .update_team_profile(team_id, &actor.user_id, update)
        .await?;

    Ok(respond("Team updated", TeamProfilePayload { team }))
}

/// Delete a team and clean up references in the secondary store.
///
/// DELETE /api/v1/teams/:team_id
///
/// Answers 207 with the pending steps when only the primary deletion
/// committed.
pub async fn delete_team(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(team_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CascadePayload>>, ApiError> {
    let cascade = state
        .services
        .cascade
        .delete_team(team_id, &actor.user_id)
        .await?;
    Ok(respond("Team deleted", CascadePayload { cascade }))
}

/// Re-run the pending cleanup of a partially deleted team.
///
/// POST /api/v1/teams/:team_id/cascade/retry
pub async fn retry_cascade(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(team_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CascadePayload>>, ApiError> {
    let cascade = state
        .services
        .cascade
        .retry_cascade(team_id, &actor.user_id)
        .await?;
    Ok(respond("Team cleanup completed", CascadePayload { cascade }))
}

/// List team members.
///
/// GET /api/v1/teams/:team_id/members
pub async fn list_members(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(team_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MembersPayload>>, ApiError> {
    let members = state
        .services
        .teams
        .list_members(team_id, &actor.user_id)
        .await?;
    let count = members.len();
    Ok(respond("Members loaded", MembersPayload { members, count }))
}

/// Invite someone to the team by email.
///
/// POST /api/v1/teams/:team_id/members
pub async fn create_invitation(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(team_id): Path<Uuid>,
    AppJson(request): AppJson<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InvitationPayload>>), ApiError> {
    actor.ensure_matches(request.actor_user_id.as_deref())?;
    request.validate()?;
    let role = request
        .parsed_role()
        .ok_or_else(|| ApiError::Validation("Role must be 'admin', 'editor' or 'viewer'".into()))?;

    let invitation = state
        .services
        .invitations
        .create_invitation(team_id, &actor.user_id, &request.email, role)
        .await?;

    info!(
        team_id = %team_id,
        invitation_id = %invitation.id,
        role = %invitation.role,
        "Invitation sent"
    );

    Ok((
        StatusCode::CREATED,
        respond("Invitation sent", InvitationPayload { invitation }),
    ))
}

/// Change a member's role.
///
/// PUT /api/v1/teams/:team_id/members/:user_id/role
pub async fn change_member_role(
    State(state): State<AppState>,
    actor: ActingUser,
    Path((team_id, user_id)): Path<(Uuid, String)>,
    AppJson(request): AppJson<ChangeMemberRoleRequest>,
) -> Result<Json<ApiResponse<MemberPayload>>, ApiError> {
    let role = Role::from_str(&request.role).map_err(ApiError::Validation)?;

    let member = state
        .services
        .teams
        .change_member_role(team_id, &actor.user_id, &user_id, role)
        .await?;

    Ok(respond("Member role updated", MemberPayload { member }))
}

/// Remove a member, or leave the team when the target is the caller.
///
/// DELETE /api/v1/teams/:team_id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    actor: ActingUser,
    Path((team_id, user_id)): Path<(Uuid, String)>,
) -> Result<Json<ApiResponse<super::Empty>>, ApiError> {
    state
        .services
        .teams
        .remove_member(team_id, &actor.user_id, &user_id)
        .await?;

    let message = if actor.user_id == user_id {
        "You left the team"
    } else {
        "Member removed"
    };
    Ok(respond(message, super::Empty {}))
}

/// Hand ownership to another member.
///
/// POST /api/v1/teams/:team_id/owner
pub async fn transfer_ownership(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(team_id): Path<Uuid>,
    AppJson(request): AppJson<TransferOwnershipRequest>,
) -> Result<Json<ApiResponse<TeamProfilePayload>>, ApiError> {
    request.validate()?;

    let team = state
        .services
        .teams
        .transfer_ownership(team_id, &actor.user_id, &request.new_owner_id)
        .await?;

    Ok(respond("Ownership transferred", TeamProfilePayload { team }))
}

/// List pending invitations of a team.
///
/// GET /api/v1/teams/:team_id/invitations
pub async fn list_team_invitations(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(team_id): Path<Uuid>,
) -> Result<Json<ApiResponse<InvitationsPayload>>, ApiError> {
    let invitations = state
        .services
        .invitations
        .list_team_invitations(team_id, &actor.user_id)
        .await?;
    let count = invitations.len();
    Ok(respond(
        "Invitations loaded",
        InvitationsPayload { invitations, count },
    ))
}

/// Withdraw a pending invitation.
///
/// DELETE /api/v1/teams/:team_id/invitations/:invite_id
pub async fn revoke_invitation(
    State(state): State<AppState>,
    actor: ActingUser,
    Path((team_id, invite_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<super::Empty>>, ApiError> {
    state
        .services
        .invitations
        .revoke_invitation(team_id, invite_id, &actor.user_id)
        .await?;
    Ok(respond("Invitation revoked", super::Empty {}))
}

/// Team activity log, newest first.
///
/// GET /api/v1/teams/:team_id/activity
pub async fn list_activity(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(team_id): Path<Uuid>,
    AppQuery(page): AppQuery<PageRequest>,
) -> Result<Json<ApiResponse<ActivityPayload>>, ApiError> {
    let (activities, pagination) = state
        .services
        .teams
        .list_activity(team_id, &actor.user_id, &page)
        .await?;
    Ok(respond(
        "Activity loaded",
        ActivityPayload {
            activities,
            pagination,
        },
    ))
}

/// Presentations attached to a team, excluding deleted and taken-down ones.
///
/// GET /api/v1/teams/:team_id/presentations
pub async fn list_team_presentations(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(team_id): Path<Uuid>,
    AppQuery(page): AppQuery<PageRequest>,
) -> Result<Json<ApiResponse<PresentationsPayload>>, ApiError> {
    let (presentations, pagination) = state
        .services
        .moderation
        .list_team_presentations(team_id, &actor.user_id, &page)
        .await?;
    Ok(respond(
        "Presentations loaded",
        PresentationsPayload {
            presentations,
            pagination,
        },
    ))
}
