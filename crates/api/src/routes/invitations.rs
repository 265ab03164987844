//! Invitee-side invitation routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{
    InvitationOutcome, InvitationResponseAction, PendingInvitation, RespondToInvitationRequest,
};
use serde::Serialize;
use uuid::Uuid;

use super::{respond, ApiResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ActingUser, AppJson};
use crate::middleware::metrics::record_invitation_response;

#[derive(Debug, Serialize)]
pub struct MyInvitationsPayload {
    pub invitations: Vec<PendingInvitation>,
    pub count: usize,
}

/// Pending invitations addressed to the caller's email.
///
/// GET /api/v1/invitations
pub async fn list_my_invitations(
    State(state): State<AppState>,
    actor: ActingUser,
) -> Result<Json<ApiResponse<MyInvitationsPayload>>, ApiError> {
    let invitations = state
        .services
        .invitations
        .list_my_invitations(&actor.user_id)
        .await?;
    let count = invitations.len();
    Ok(respond(
        "Invitations loaded",
        MyInvitationsPayload { invitations, count },
    ))
}

/// Accept or decline an invitation.
///
/// POST /api/v1/invitations/:invite_id/respond
pub async fn respond_to_invitation(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(invite_id): Path<Uuid>,
    AppJson(request): AppJson<RespondToInvitationRequest>,
) -> Result<Json<ApiResponse<InvitationOutcome>>, ApiError> {
    let outcome = state
        .services
        .invitations
        .respond_to_invitation(invite_id, &actor.user_id, request.action)
        .await?;

    let (action, message) = match request.action {
        InvitationResponseAction::Accept => ("accept", "Invitation accepted"),
        InvitationResponseAction::Decline => ("decline", "Invitation declined"),
    };
    record_invitation_response(action);

    Ok(respond(message, outcome))
}
