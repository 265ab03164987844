//! Team invitation domain models.
//!
//! An invitation is an unresolved offer of membership at a given role, unique
//! per (team, email). It is consumed exactly once: accepting or declining
//! deletes it, so a repeated response finds nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::role::Role;
use super::team::TeamMember;

/// Pending invitation domain model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PendingInvitation {
    pub id: Uuid,
    pub team_id: Uuid,
    /// Normalized (lowercase) invitee email.
    pub email: String,
    pub role: Role,
    pub invited_by: String,
    pub invited_at: DateTime<Utc>,
}

/// Input for creating an invitation.
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub team_id: Uuid,
    pub email: String,
    pub role: Role,
    pub invited_by: String,
}

/// How the invitee answers an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationResponseAction {
    Accept,
    Decline,
}

/// Result of resolving an invitation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InvitationOutcome {
    Accepted { membership: TeamMember },
    Declined { invitation_id: Uuid, team_id: Uuid },
}

/// Request to invite someone to a team (`POST /teams/:team_id/members`).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateInvitationRequest {
    /// Optional echo of the acting user; must match the authenticated caller.
    #[serde(default, alias = "actorUserId")]
    pub actor_user_id: Option<String>,

    /// Email address of the invitee.
    #[validate(email(message = "Invalid email address"))]
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: String,

    /// Role to assign when accepted ("admin", "editor" or "viewer").
    #[validate(custom(function = "validate_invitation_role"))]
    pub role: String,
}

impl CreateInvitationRequest {
    /// Parsed role. Only meaningful after `validate()` succeeded.
    pub fn parsed_role(&self) -> Option<Role> {
        Role::from_str(&self.role).ok()
    }
}

/// Request to accept or decline an invitation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RespondToInvitationRequest {
    pub action: InvitationResponseAction,
}

/// Validate role value for the invitation path.
pub fn validate_invitation_role(role: &str) -> Result<(), validator::ValidationError> {
    match Role::from_str(role) {
        Ok(r) if r.is_invitable() => Ok(()),
        _ => {
            let mut err = validator::ValidationError::new("invalid_role");
            err.message = Some("Role must be 'admin', 'editor' or 'viewer'".into());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, role: &str) -> CreateInvitationRequest {
        CreateInvitationRequest {
            actor_user_id: None,
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_create_invitation_request_validation() {
        let valid = request("u2@x.com", "editor");
        assert!(valid.validate().is_ok());
        assert_eq!(valid.parsed_role(), Some(Role::Editor));
    }

    #[test]
    fn test_create_invitation_invalid_email() {
        assert!(request("not-an-email", "viewer").validate().is_err());
    }

    #[test]
    fn test_create_invitation_rejects_owner_and_unknown_roles() {
        assert!(request("u2@x.com", "owner").validate().is_err());
        assert!(request("u2@x.com", "guest").validate().is_err());
        assert!(request("u2@x.com", "superadmin").validate().is_err());
    }

    #[test]
    fn test_create_invitation_accepts_camel_case_actor() {
        let req: CreateInvitationRequest = serde_json::from_str(
            r#"{"actorUserId":"auth0|a","email":"u2@x.com","role":"viewer"}"#,
        )
        .unwrap();
        assert_eq!(req.actor_user_id.as_deref(), Some("auth0|a"));
    }

    #[test]
    fn test_response_action_deserialization() {
        let req: RespondToInvitationRequest =
            serde_json::from_str(r#"{"action":"accept"}"#).unwrap();
        assert_eq!(req.action, InvitationResponseAction::Accept);
        assert!(serde_json::from_str::<RespondToInvitationRequest>(r#"{"action":"maybe"}"#).is_err());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = InvitationOutcome::Declined {
            invitation_id: Uuid::nil(),
            team_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "declined");
    }
}
