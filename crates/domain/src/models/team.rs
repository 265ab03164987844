//! Team and team membership domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::role::Role;

// Team names start with a letter or digit and contain no control characters.
lazy_static::lazy_static! {
    pub static ref TEAM_NAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[\p{L}\p{N}][^\p{Cc}]*$").expect("valid team name regex");
}

/// Team domain model.
///
/// Exactly one member holds the `owner` role and that member is `owner_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub owner_id: String,
    /// Branding and other settings, opaque to this service.
    pub settings: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the (team_id, user_id, role) membership relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TeamMember {
    pub team_id: Uuid,
    pub user_id: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
}

/// Team with its membership list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TeamWithMembers {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMember>,
}

impl TeamWithMembers {
    /// Members holding the owner role. Always exactly one for a consistent team.
    pub fn owners(&self) -> impl Iterator<Item = &TeamMember> {
        self.members.iter().filter(|m| m.role == Role::Owner)
    }
}

/// Input for creating a team; the creator becomes its owner.
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub owner_id: String,
    pub settings: JsonValue,
}

/// Partial profile update.
#[derive(Debug, Clone, Default)]
pub struct TeamProfileUpdate {
    pub name: Option<String>,
    pub settings: Option<JsonValue>,
}

impl TeamProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.settings.is_none()
    }
}

/// Request to create a team.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateTeamRequest {
    #[validate(custom(function = "validate_team_name"))]
    pub name: String,

    #[validate(custom(function = "validate_settings"))]
    pub settings: Option<JsonValue>,
}

/// Request to update a team's profile.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateTeamRequest {
    #[validate(custom(function = "validate_team_name"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_settings"))]
    pub settings: Option<JsonValue>,
}

/// Request to change a member's role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChangeMemberRoleRequest {
    pub role: String,
}

/// Request to hand team ownership to another member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct TransferOwnershipRequest {
    #[validate(length(min = 1, max = 255, message = "new_owner_id is required"))]
    pub new_owner_id: String,
}

/// Validate a team name.
pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    shared::validation::validate_display_name(name)?;
    if !TEAM_NAME_REGEX.is_match(name.trim()) {
        let mut err = ValidationError::new("team_name");
        err.message = Some("Team name must start with a letter or digit".into());
        return Err(err);
    }
    Ok(())
}

/// Team settings must be a JSON object.
pub fn validate_settings(settings: &JsonValue) -> Result<(), ValidationError> {
    if settings.is_object() {
        Ok(())
    } else {
        let mut err = ValidationError::new("settings");
        err.message = Some("Settings must be a JSON object".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member(role: Role) -> TeamMember {
        TeamMember {
            team_id: Uuid::nil(),
            user_id: format!("user-{role}"),
            role,
            joined_at: Utc::now(),
            added_by: None,
        }
    }

    #[test]
    fn test_validate_team_name() {
        assert!(validate_team_name("Design Guild").is_ok());
        assert!(validate_team_name("42 Club").is_ok());
        assert!(validate_team_name("Équipe Ä").is_ok());
        assert!(validate_team_name("-dash first").is_err());
        assert!(validate_team_name("").is_err());
    }

    #[test]
    fn test_create_team_request_validation() {
        let valid = CreateTeamRequest {
            name: "Marketing".to_string(),
            settings: Some(json!({"brand_color": "#ff0000"})),
        };
        assert!(valid.validate().is_ok());

        let invalid = CreateTeamRequest {
            name: "Marketing".to_string(),
            settings: Some(json!([1, 2, 3])),
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_update_team_request_allows_partial() {
        let req = UpdateTeamRequest {
            name: None,
            settings: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_profile_update_is_empty() {
        assert!(TeamProfileUpdate::default().is_empty());
        let update = TeamProfileUpdate {
            name: Some("New".into()),
            settings: None,
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_team_with_members_owners() {
        let team = Team {
            id: Uuid::nil(),
            name: "T1".into(),
            owner_id: "user-owner".into(),
            settings: json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let with_members = TeamWithMembers {
            team,
            members: vec![member(Role::Owner), member(Role::Editor)],
        };
        assert_eq!(with_members.owners().count(), 1);

        let json = serde_json::to_value(&with_members).unwrap();
        assert_eq!(json["name"], "T1");
        assert_eq!(json["members"].as_array().unwrap().len(), 2);
    }
}
