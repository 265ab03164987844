//! Team activity (audit trail) domain models.
//!
//! Entries are append-only. The envelope (action type, actor, target) is
//! strongly typed; `details` is a loosely-typed side channel for UI formatting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::str::FromStr;
use uuid::Uuid;

/// Closed set of audited team actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    TeamCreated,
    MemberAdded,
    MemberRemoved,
    MemberRoleChanged,
    TeamProfileUpdated,
    PresentationCreated,
    PresentationDeleted,
    AssetUploaded,
    AssetDeleted,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::TeamCreated => "team_created",
            ActivityType::MemberAdded => "member_added",
            ActivityType::MemberRemoved => "member_removed",
            ActivityType::MemberRoleChanged => "member_role_changed",
            ActivityType::TeamProfileUpdated => "team_profile_updated",
            ActivityType::PresentationCreated => "presentation_created",
            ActivityType::PresentationDeleted => "presentation_deleted",
            ActivityType::AssetUploaded => "asset_uploaded",
            ActivityType::AssetDeleted => "asset_deleted",
        }
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team_created" => Ok(ActivityType::TeamCreated),
            "member_added" => Ok(ActivityType::MemberAdded),
            "member_removed" => Ok(ActivityType::MemberRemoved),
            "member_role_changed" => Ok(ActivityType::MemberRoleChanged),
            "team_profile_updated" => Ok(ActivityType::TeamProfileUpdated),
            "presentation_created" => Ok(ActivityType::PresentationCreated),
            "presentation_deleted" => Ok(ActivityType::PresentationDeleted),
            "asset_uploaded" => Ok(ActivityType::AssetUploaded),
            "asset_deleted" => Ok(ActivityType::AssetDeleted),
            _ => Err(format!("Unknown activity type: {}", s)),
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TeamActivity {
    pub id: Uuid,
    pub team_id: Uuid,
    pub actor_id: String,
    pub actor_name: String,
    pub action_type: ActivityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    pub details: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// Input for appending an activity entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub team_id: Uuid,
    pub actor_id: String,
    pub actor_name: String,
    pub action_type: ActivityType,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub target_name: Option<String>,
    pub details: JsonValue,
}

/// Builder for activity entries with a fluent API.
#[derive(Debug, Clone)]
pub struct ActivityBuilder {
    team_id: Uuid,
    actor_id: String,
    actor_name: String,
    action_type: ActivityType,
    target_type: Option<String>,
    target_id: Option<String>,
    target_name: Option<String>,
    details: Map<String, JsonValue>,
}

impl ActivityBuilder {
    pub fn new(
        team_id: Uuid,
        actor_id: impl Into<String>,
        actor_name: impl Into<String>,
        action_type: ActivityType,
    ) -> Self {
        Self {
            team_id,
            actor_id: actor_id.into(),
            actor_name: actor_name.into(),
            action_type,
            target_type: None,
            target_id: None,
            target_name: None,
            details: Map::new(),
        }
    }

    /// Set the target being acted upon.
    pub fn on_target(mut self, target_type: impl Into<String>, target_id: impl Into<String>) -> Self {
        self.target_type = Some(target_type.into());
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    /// Add a single detail attribute.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> NewActivity {
        NewActivity {
            team_id: self.team_id,
            actor_id: self.actor_id,
            actor_name: self.actor_name,
            action_type: self.action_type,
            target_type: self.target_type,
            target_id: self.target_id,
            target_name: self.target_name,
            details: JsonValue::Object(self.details),
        }
    }
}
