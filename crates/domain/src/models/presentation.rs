//! Presentation (content) domain models.
//!
//! A presentation carries two independent axes: its moderation status and its
//! soft-delete flag. A record can be `taken_down` without being deleted, or
//! `active` while soft-deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Admin-controlled visibility classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    #[default]
    Active,
    UnderReview,
    TakenDown,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Active => "active",
            ModerationStatus::UnderReview => "under_review",
            ModerationStatus::TakenDown => "taken_down",
        }
    }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ModerationStatus::Active),
            "under_review" => Ok(ModerationStatus::UnderReview),
            "taken_down" => Ok(ModerationStatus::TakenDown),
            _ => Err(format!("Unknown moderation status: {}", s)),
        }
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation domain model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Presentation {
    pub id: Uuid,
    pub title: String,
    /// Weak reference into the primary store. A dangling or null value is valid.
    pub team_id: Option<Uuid>,
    pub owner_id: String,
    pub moderation_status: ModerationStatus,
    pub moderation_notes: Option<String>,
    pub moderated_by: Option<String>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Presentation {
    /// Whether a non-admin caller may see this record at all.
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        if self.deleted {
            return false;
        }
        match self.moderation_status {
            ModerationStatus::TakenDown => self.owner_id == user_id,
            _ => true,
        }
    }

    /// Whether the record shows up in team listings.
    pub fn is_listed(&self) -> bool {
        !self.deleted && self.moderation_status != ModerationStatus::TakenDown
    }
}

/// Input for creating a presentation.
#[derive(Debug, Clone)]
pub struct NewPresentation {
    pub title: String,
    pub team_id: Option<Uuid>,
    pub owner_id: String,
}

/// One recorded moderation status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModerationEvent {
    pub id: Uuid,
    pub presentation_id: Uuid,
    pub from_status: ModerationStatus,
    pub to_status: ModerationStatus,
    pub actor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A status change to apply to a presentation.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: ModerationStatus,
    pub notes: Option<String>,
    pub actor_id: String,
    pub at: DateTime<Utc>,
}

/// Filter for presentation listings.
#[derive(Debug, Clone, Default)]
pub struct PresentationFilter {
    pub status: Option<ModerationStatus>,
    pub team_id: Option<Uuid>,
    pub include_deleted: bool,
    pub exclude_taken_down: bool,
}

impl PresentationFilter {
    pub fn matches(&self, p: &Presentation) -> bool {
        if !self.include_deleted && p.deleted {
            return false;
        }
        if self.exclude_taken_down && p.moderation_status == ModerationStatus::TakenDown {
            return false;
        }
        if let Some(status) = self.status {
            if p.moderation_status != status {
                return false;
            }
        }
        if let Some(team_id) = self.team_id {
            if p.team_id != Some(team_id) {
                return false;
            }
        }
        true
    }
}

/// Request to create a presentation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreatePresentationRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    pub team_id: Option<Uuid>,
}

/// Request to set moderation status.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SetStatusRequest {
    pub status: ModerationStatus,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// Query for `DELETE /presentations/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeletePresentationQuery {
    pub permanent: Option<bool>,
}

impl DeletePresentationQuery {
    pub fn is_permanent(&self) -> bool {
        self.permanent.unwrap_or(false)
    }
}

/// Query for the admin presentation listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPresentationsQuery {
    pub status: Option<ModerationStatus>,
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub include_deleted: bool,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListPresentationsQuery {
    pub fn filter(&self) -> PresentationFilter {
        PresentationFilter {
            status: self.status,
            team_id: self.team_id,
            include_deleted: self.include_deleted,
            exclude_taken_down: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presentation(status: ModerationStatus, deleted: bool) -> Presentation {
        Presentation {
            id: Uuid::new_v4(),
            title: "Quarterly review".into(),
            team_id: None,
            owner_id: "owner".into(),
            moderation_status: status,
            moderation_notes: None,
            moderated_by: None,
            moderated_at: None,
            deleted,
            deleted_at: None,
            deleted_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ModerationStatus::UnderReview).unwrap(),
            "\"under_review\""
        );
        let status: ModerationStatus = serde_json::from_str("\"taken_down\"").unwrap();
        assert_eq!(status, ModerationStatus::TakenDown);
        assert!(serde_json::from_str::<ModerationStatus>("\"hidden\"").is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(ModerationStatus::from_str("ACTIVE").unwrap(), ModerationStatus::Active);
        assert!(ModerationStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_visibility_rules() {
        assert!(presentation(ModerationStatus::Active, false).is_visible_to("someone"));
        assert!(presentation(ModerationStatus::UnderReview, false).is_visible_to("someone"));
        assert!(!presentation(ModerationStatus::Active, true).is_visible_to("owner"));

        let taken_down = presentation(ModerationStatus::TakenDown, false);
        assert!(taken_down.is_visible_to("owner"));
        assert!(!taken_down.is_visible_to("someone"));
        assert!(!taken_down.is_listed());
    }

    #[test]
    fn test_filter_matches() {
        let team_id = Uuid::new_v4();
        let mut p = presentation(ModerationStatus::UnderReview, false);
        p.team_id = Some(team_id);

        assert!(PresentationFilter::default().matches(&p));
        let by_team = PresentationFilter {
            team_id: Some(team_id),
            ..Default::default()
        };
        assert!(by_team.matches(&p));
        let by_status = PresentationFilter {
            status: Some(ModerationStatus::Active),
            ..Default::default()
        };
        assert!(!by_status.matches(&p));

        p.deleted = true;
        assert!(!PresentationFilter::default().matches(&p));
        let with_deleted = PresentationFilter {
            include_deleted: true,
            ..Default::default()
        };
        assert!(with_deleted.matches(&p));
    }

    #[test]
    fn test_set_status_request_notes_limit() {
        let req = SetStatusRequest {
            status: ModerationStatus::TakenDown,
            notes: Some("x".repeat(1001)),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_delete_query_defaults_to_soft() {
        assert!(!DeletePresentationQuery::default().is_permanent());
        let q = DeletePresentationQuery {
            permanent: Some(true),
        };
        assert!(q.is_permanent());
    }
}
